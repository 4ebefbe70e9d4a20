use crate::bits;
use crate::catalog::EntityCatalog;
use crate::language::{self, LANGUAGE_NONE};
use crate::revision::{DexLayout, RevisionPolicy};
use crate::{DexError, Result};

/// Per-entity observation state, stored as a 4-bit nibble (two entities per
/// byte). Only the three listed values are ever written; raw nibbles 3..=15
/// read back as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EntryState {
    None = 0,
    Seen = 1,
    Caught = 2,
}

impl EntryState {
    pub fn from_raw(value: u8) -> EntryState {
        match value {
            1 => EntryState::Seen,
            2 => EntryState::Caught,
            _ => EntryState::None,
        }
    }
}

/// The four independent seen bits of one entity. The codec enforces no
/// exclusivity between them; sex restrictions are the bulk operator's job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenderFlags {
    pub male: bool,
    pub female: bool,
    pub male_shiny: bool,
    pub female_shiny: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservedGender {
    Male,
    Female,
    Genderless,
}

/// A single capture observation to fold into the ledger.
#[derive(Debug, Clone, Copy)]
pub struct Observation {
    pub entity: u16,
    pub form: u8,
    pub gender: ObservedGender,
    pub shiny: bool,
    /// Raw save-file language code of the observing game.
    pub language: u8,
}

/// Packed status ledger over a byte region inside a larger save buffer.
///
/// The ledger owns nothing: it borrows the container's buffer for the editing
/// session and addresses a fixed-layout region starting at `base`. All
/// offsets and the form-slot flattening are fixed at construction from the
/// injected revision policy and catalog.
pub struct DexLedger<'a, C: EntityCatalog> {
    data: &'a mut [u8],
    base: usize,
    policy: RevisionPolicy,
    layout: DexLayout,
    /// First flattened form-plane slot per entity (prefix sums of the
    /// catalog's form counts), indexed by entity ID.
    form_start: Vec<u32>,
    catalog: &'a C,
}

impl<'a, C: EntityCatalog> DexLedger<'a, C> {
    pub fn new(
        data: &'a mut [u8],
        base: usize,
        policy: RevisionPolicy,
        catalog: &'a C,
    ) -> Result<Self> {
        let layout = DexLayout::compute(&policy, catalog);
        if data.len() < base + layout.total_len {
            return Err(DexError::BufferTooSmall {
                base,
                needed: layout.total_len,
                len: data.len(),
            });
        }

        let mut form_start = vec![0u32; policy.form_max_id as usize + 1];
        let mut next_slot = 0u32;
        for entity in 1..=policy.form_max_id {
            form_start[entity as usize] = next_slot;
            next_slot += u32::from(catalog.form_count(entity));
        }

        Ok(Self {
            data,
            base,
            policy,
            layout,
            form_start,
            catalog,
        })
    }

    pub fn policy(&self) -> &RevisionPolicy {
        &self.policy
    }

    pub fn layout(&self) -> &DexLayout {
        &self.layout
    }

    pub fn catalog(&self) -> &C {
        self.catalog
    }

    /// Form count the catalog reports for `entity`; 0 beyond the revision's
    /// form bound, since no plane bits exist there.
    pub fn form_count(&self, entity: u16) -> u8 {
        if entity == 0 || entity > self.policy.form_max_id {
            return 0;
        }
        self.catalog.form_count(entity)
    }

    fn check_entity(&self, entity: u16) -> Result<()> {
        if entity == 0 || entity > self.policy.max_id {
            return Err(DexError::EntityOutOfRange {
                entity,
                max: self.policy.max_id,
            });
        }
        Ok(())
    }

    // --- state nibble -----------------------------------------------------

    pub fn state(&self, entity: u16) -> Result<EntryState> {
        self.check_entity(entity)?;
        let ofs = bits::state_offset(entity, self.policy.max_id)?;
        let byte = self.data[self.base + self.layout.ofs_state + ofs];
        Ok(EntryState::from_raw(bits::get_nibble(
            byte,
            bits::state_shift(entity),
        )))
    }

    pub fn set_state(&mut self, entity: u16, state: EntryState) -> Result<()> {
        self.check_entity(entity)?;
        let ofs = bits::state_offset(entity, self.policy.max_id)?;
        let at = self.base + self.layout.ofs_state + ofs;
        self.data[at] = bits::set_nibble(self.data[at], bits::state_shift(entity), state as u8);
        Ok(())
    }

    pub fn is_seen(&self, entity: u16) -> Result<bool> {
        Ok(self.state(entity)? != EntryState::None)
    }

    pub fn is_caught(&self, entity: u16) -> Result<bool> {
        Ok(self.state(entity)? == EntryState::Caught)
    }

    // --- gender/shiny seen planes ----------------------------------------

    fn plane_bit(&self, plane_base: usize, index: u32, capacity: u32) -> Result<bool> {
        let ofs = bits::plane_offset(index, plane_base, capacity)?;
        Ok(bits::get_bit(
            self.data[self.base + ofs],
            bits::plane_bit_pos(index),
        ))
    }

    fn set_plane_bit(
        &mut self,
        plane_base: usize,
        index: u32,
        capacity: u32,
        value: bool,
    ) -> Result<()> {
        let ofs = bits::plane_offset(index, plane_base, capacity)?;
        let at = self.base + ofs;
        self.data[at] = bits::set_bit(self.data[at], bits::plane_bit_pos(index), value);
        Ok(())
    }

    pub fn gender_flags(&self, entity: u16) -> Result<GenderFlags> {
        self.check_entity(entity)?;
        let index = u32::from(entity - 1);
        let capacity = u32::from(self.policy.max_id);
        Ok(GenderFlags {
            male: self.plane_bit(self.layout.ofs_seen_male, index, capacity)?,
            female: self.plane_bit(self.layout.ofs_seen_female, index, capacity)?,
            male_shiny: self.plane_bit(self.layout.ofs_seen_male_shiny, index, capacity)?,
            female_shiny: self.plane_bit(self.layout.ofs_seen_female_shiny, index, capacity)?,
        })
    }

    pub fn set_gender_flags(&mut self, entity: u16, flags: GenderFlags) -> Result<()> {
        self.check_entity(entity)?;
        let index = u32::from(entity - 1);
        let capacity = u32::from(self.policy.max_id);
        self.set_plane_bit(self.layout.ofs_seen_male, index, capacity, flags.male)?;
        self.set_plane_bit(self.layout.ofs_seen_female, index, capacity, flags.female)?;
        self.set_plane_bit(
            self.layout.ofs_seen_male_shiny,
            index,
            capacity,
            flags.male_shiny,
        )?;
        self.set_plane_bit(
            self.layout.ofs_seen_female_shiny,
            index,
            capacity,
            flags.female_shiny,
        )
    }

    // --- form ownership planes -------------------------------------------

    /// Flattened form-plane slot for `(entity, form)`. `Ok(None)` when the
    /// entity has no addressable form bits under this revision.
    fn form_slot(&self, entity: u16, form: u8) -> Result<Option<u32>> {
        self.check_entity(entity)?;
        if entity > self.policy.form_max_id {
            return Ok(None);
        }
        let count = self.catalog.form_count(entity);
        if count == 0 {
            return Ok(None);
        }
        if form >= count {
            return Err(DexError::FormOutOfRange {
                entity,
                form,
                count,
            });
        }
        Ok(Some(self.form_start[entity as usize] + u32::from(form)))
    }

    pub fn form_flag(&self, entity: u16, form: u8, shiny: bool) -> Result<bool> {
        let Some(slot) = self.form_slot(entity, form)? else {
            return Ok(false);
        };
        let plane = if shiny {
            self.layout.ofs_form_shiny
        } else {
            self.layout.ofs_form
        };
        self.plane_bit(plane, slot, self.layout.form_slots)
    }

    pub fn set_form_flag(&mut self, entity: u16, form: u8, shiny: bool, value: bool) -> Result<()> {
        let Some(slot) = self.form_slot(entity, form)? else {
            return Ok(());
        };
        let plane = if shiny {
            self.layout.ofs_form_shiny
        } else {
            self.layout.ofs_form
        };
        self.set_plane_bit(plane, slot, self.layout.form_slots, value)
    }

    // --- language acquisition words ---------------------------------------

    fn language_offset(&self, entity: u16) -> usize {
        self.base + self.layout.ofs_language + 4 * (entity as usize - 1)
    }

    /// Raw acquisition mask; `LANGUAGE_NONE` beyond the legacy bound, where
    /// the word does not exist on disk.
    pub fn language_mask(&self, entity: u16) -> Result<u32> {
        self.check_entity(entity)?;
        if entity > self.policy.language_max_id {
            return Ok(LANGUAGE_NONE);
        }
        Ok(language::read_mask(self.data, self.language_offset(entity)))
    }

    /// Writes are silently absorbed beyond the legacy bound: the same call
    /// sites must work against both revisions without branching.
    pub fn set_language_mask(&mut self, entity: u16, mask: u32) -> Result<()> {
        self.check_entity(entity)?;
        if entity > self.policy.language_max_id {
            return Ok(());
        }
        let ofs = self.language_offset(entity);
        language::write_mask(self.data, ofs, mask);
        Ok(())
    }

    pub fn language_flag(&self, entity: u16, language_code: u8) -> Result<bool> {
        let Some(bit) = language::language_bit(language_code) else {
            self.check_entity(entity)?;
            return Ok(false);
        };
        Ok(self.language_mask(entity)? & (1 << bit) != 0)
    }

    pub fn set_language_flag(&mut self, entity: u16, language_code: u8, value: bool) -> Result<()> {
        let Some(bit) = language::language_bit(language_code) else {
            // Unknown codes are a defined no-op, but the ID is still checked.
            self.check_entity(entity)?;
            return Ok(());
        };
        let current = self.language_mask(entity)?;
        let mask = 1u32 << bit;
        let update = if value { current | mask } else { current & !mask };
        self.set_language_mask(entity, update)
    }

    // --- whole-entry operations -------------------------------------------

    /// Reset every field of one entity to its zero state. Clearing never
    /// removes storage; it writes `None` and clears all flag bits.
    pub fn clear_entry(&mut self, entity: u16) -> Result<()> {
        self.set_state(entity, EntryState::None)?;
        self.set_gender_flags(entity, GenderFlags::default())?;
        for form in 0..self.form_count(entity) {
            self.set_form_flag(entity, form, false, false)?;
            self.set_form_flag(entity, form, true, false)?;
        }
        self.set_language_mask(entity, LANGUAGE_NONE)
    }

    /// Fold one capture observation into the entry: state becomes Caught,
    /// the matching seen bits are set, and within the legacy bounds the
    /// language and form-ownership flags are recorded. Genderless entities
    /// count against the male plane.
    pub fn record_observation(&mut self, obs: &Observation) -> Result<()> {
        self.set_state(obs.entity, EntryState::Caught)?;

        let mut flags = self.gender_flags(obs.entity)?;
        match obs.gender {
            ObservedGender::Male | ObservedGender::Genderless => {
                flags.male = true;
                flags.male_shiny |= obs.shiny;
            }
            ObservedGender::Female => {
                flags.female = true;
                flags.female_shiny |= obs.shiny;
            }
        }
        self.set_gender_flags(obs.entity, flags)?;

        self.set_language_flag(obs.entity, obs.language, true)?;
        // Observed forms outside the catalog's dex range (battle-only and
        // the like) have no plane bit; skip rather than clobber a neighbor.
        if obs.form < self.form_count(obs.entity) {
            self.set_form_flag(obs.entity, obs.form, obs.shiny, true)?;
        }
        Ok(())
    }

    // --- tallies -----------------------------------------------------------

    pub fn seen_count(&self) -> usize {
        (1..=self.policy.max_id)
            .filter(|&entity| matches!(self.state(entity), Ok(s) if s != EntryState::None))
            .count()
    }

    pub fn caught_count(&self) -> usize {
        (1..=self.policy.max_id)
            .filter(|&entity| matches!(self.state(entity), Ok(EntryState::Caught)))
            .count()
    }
}
