use serde::{Deserialize, Serialize};

use crate::catalog::EntityCatalog;

/// Named on-disk layout revisions.
///
/// `Classic` is the original layout: 493 entities, every field present for
/// the whole range. `Extended` raises the entity ceiling to 1010 but keeps
/// the per-entity language words and form planes only for the first 493 —
/// those regions were never widened on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Revision {
    Classic,
    Extended,
}

impl Revision {
    pub fn policy(self) -> RevisionPolicy {
        match self {
            Revision::Classic => RevisionPolicy {
                max_id: 493,
                language_max_id: 493,
                form_max_id: 493,
            },
            Revision::Extended => RevisionPolicy {
                max_id: 1010,
                language_max_id: 493,
                form_max_id: 493,
            },
        }
    }
}

/// The three scalars that distinguish the layout revisions. Injected at
/// ledger construction and never mutated afterward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevisionPolicy {
    /// Highest addressable entity ID for state and gender flags.
    pub max_id: u16,
    /// Highest entity ID that has a language-acquisition word on disk.
    pub language_max_id: u16,
    /// Highest entity ID covered by the form-ownership planes.
    pub form_max_id: u16,
}

/// Plane base offsets relative to the ledger base, derived once from the
/// policy and the catalog's form counts.
///
/// Region order on disk:
///
/// | region              | offset                  | size                      |
/// |---------------------|-------------------------|---------------------------|
/// | state nibbles       | 0                       | max_id/2 + 1              |
/// | seen male           | ofs_seen_male           | ceil(max_id/8)            |
/// | seen female         | ofs_seen_female         | ceil(max_id/8)            |
/// | seen male shiny     | ofs_seen_male_shiny     | ceil(max_id/8)            |
/// | seen female shiny   | ofs_seen_female_shiny   | ceil(max_id/8)            |
/// | form owned          | ofs_form                | ceil(form_slots/8)        |
/// | form owned shiny    | ofs_form_shiny          | ceil(form_slots/8)        |
/// | language words (LE) | ofs_language (4-aligned)| 4 * language_max_id       |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DexLayout {
    pub ofs_state: usize,
    pub ofs_seen_male: usize,
    pub ofs_seen_female: usize,
    pub ofs_seen_male_shiny: usize,
    pub ofs_seen_female_shiny: usize,
    pub ofs_form: usize,
    pub ofs_form_shiny: usize,
    pub ofs_language: usize,
    /// Total flattened (entity, form) slots per form plane.
    pub form_slots: u32,
    /// Byte length of the whole ledger region.
    pub total_len: usize,
}

impl DexLayout {
    pub fn compute(policy: &RevisionPolicy, catalog: &impl EntityCatalog) -> DexLayout {
        let max = policy.max_id as usize;
        let state_len = max / 2 + 1;
        let plane_len = max.div_ceil(8);

        let form_slots: u32 = (1..=policy.form_max_id)
            .map(|entity| u32::from(catalog.form_count(entity)))
            .sum();
        let form_plane_len = (form_slots as usize).div_ceil(8);

        let ofs_seen_male = state_len;
        let ofs_seen_female = ofs_seen_male + plane_len;
        let ofs_seen_male_shiny = ofs_seen_female + plane_len;
        let ofs_seen_female_shiny = ofs_seen_male_shiny + plane_len;
        let ofs_form = ofs_seen_female_shiny + plane_len;
        let ofs_form_shiny = ofs_form + form_plane_len;
        // Language words are 4-byte aligned.
        let ofs_language = (ofs_form_shiny + form_plane_len).next_multiple_of(4);
        let total_len = ofs_language + 4 * policy.language_max_id as usize;

        DexLayout {
            ofs_state: 0,
            ofs_seen_male,
            ofs_seen_female,
            ofs_seen_male_shiny,
            ofs_seen_female_shiny,
            ofs_form,
            ofs_form_shiny,
            ofs_language,
            form_slots,
            total_len,
        }
    }
}
