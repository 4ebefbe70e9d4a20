use tracing::debug;

use crate::catalog::EntityCatalog;
use crate::language::LANGUAGE_ALL;
use crate::ledger::{DexLedger, EntryState, GenderFlags};
use crate::Result;

/// Whole-range operations over a borrowed ledger.
///
/// Every operation iterates the full valid ID range; fields that do not
/// apply to a given entity (language words beyond the legacy bound, absent
/// form bits) are skipped for that entity only, never by terminating the
/// loop. Sex restrictions come from the catalog: a male-seen bit is only set
/// for entities that are not female-only, and vice versa.
pub struct BulkOperator<'l, 'a, C: EntityCatalog> {
    ledger: &'l mut DexLedger<'a, C>,
    /// The container's configured language code, recorded on caught entries.
    save_language: u8,
}

impl<'l, 'a, C: EntityCatalog> BulkOperator<'l, 'a, C> {
    pub fn new(ledger: &'l mut DexLedger<'a, C>, save_language: u8) -> Self {
        Self {
            ledger,
            save_language,
        }
    }

    fn catalog_gender_flags(&self, entity: u16, shiny_too: bool) -> GenderFlags {
        let male = !self.ledger.catalog().only_female(entity);
        let female = !self.ledger.catalog().only_male(entity);
        GenderFlags {
            male,
            female,
            male_shiny: male && shiny_too,
            female_shiny: female && shiny_too,
        }
    }

    /// Raise every entity to at least Seen; Caught entries keep their state.
    pub fn mark_all_seen(&mut self, shiny_too: bool) -> Result<()> {
        let max = self.ledger.policy().max_id;
        for entity in 1..=max {
            if !self.ledger.is_seen(entity)? {
                self.ledger.set_state(entity, EntryState::Seen)?;
            }
            let flags = self.catalog_gender_flags(entity, shiny_too);
            self.ledger.set_gender_flags(entity, flags)?;
        }
        debug!(entities = max, shiny_too, "marked all seen");
        Ok(())
    }

    /// Set every entity to Caught and record the container's language on
    /// each entry that still has a language word.
    pub fn mark_all_caught(&mut self, shiny_too: bool) -> Result<()> {
        let max = self.ledger.policy().max_id;
        for entity in 1..=max {
            self.ledger.set_state(entity, EntryState::Caught)?;
            let flags = self.catalog_gender_flags(entity, shiny_too);
            self.ledger.set_gender_flags(entity, flags)?;
            // Absorbed by the ledger beyond the legacy language bound.
            self.ledger
                .set_language_flag(entity, self.save_language, true)?;
        }
        debug!(entities = max, shiny_too, "marked all caught");
        Ok(())
    }

    /// Downgrade every Caught entity to Seen and drop its language
    /// acquisitions, leaving seen flags untouched.
    pub fn caught_none(&mut self) -> Result<()> {
        let max = self.ledger.policy().max_id;
        for entity in 1..=max {
            if self.ledger.is_caught(entity)? {
                self.ledger.set_state(entity, EntryState::Seen)?;
            }
            self.ledger.set_language_mask(entity, 0)?;
        }
        debug!(entities = max, "downgraded caught entries to seen");
        Ok(())
    }

    pub fn clear_all(&mut self) -> Result<()> {
        let max = self.ledger.policy().max_id;
        for entity in 1..=max {
            self.ledger.clear_entry(entity)?;
        }
        debug!(entities = max, "cleared all entries");
        Ok(())
    }

    /// Fully populate one entry: Caught, all applicable gender flags, every
    /// form-ownership bit (shiny too when requested), and the full language
    /// mask where the word exists.
    pub fn complete_entry(&mut self, entity: u16, shiny_too: bool) -> Result<()> {
        self.ledger.set_state(entity, EntryState::Caught)?;
        let flags = self.catalog_gender_flags(entity, shiny_too);
        self.ledger.set_gender_flags(entity, flags)?;

        for form in 0..self.ledger.form_count(entity) {
            self.ledger.set_form_flag(entity, form, false, true)?;
            if shiny_too {
                self.ledger.set_form_flag(entity, form, true, true)?;
            }
        }

        self.ledger.set_language_mask(entity, LANGUAGE_ALL)
    }

    pub fn complete_all(&mut self, shiny_too: bool) -> Result<()> {
        let max = self.ledger.policy().max_id;
        for entity in 1..=max {
            self.complete_entry(entity, shiny_too)?;
        }
        debug!(entities = max, shiny_too, "completed all entries");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogEntry, TableCatalog};
    use crate::language::{Language, LANGUAGE_NONE};
    use crate::revision::{DexLayout, RevisionPolicy};

    fn policy() -> RevisionPolicy {
        RevisionPolicy {
            max_id: 20,
            language_max_id: 10,
            form_max_id: 10,
        }
    }

    fn catalog() -> TableCatalog {
        let mut catalog = TableCatalog::neutral();
        catalog.set(
            3,
            CatalogEntry {
                form_count: 2,
                ..CatalogEntry::default()
            },
        );
        catalog.set(
            7,
            CatalogEntry {
                only_female: true,
                ..CatalogEntry::default()
            },
        );
        catalog.set(
            8,
            CatalogEntry {
                only_male: true,
                ..CatalogEntry::default()
            },
        );
        catalog
    }

    fn buffer(policy: &RevisionPolicy, catalog: &TableCatalog) -> Vec<u8> {
        vec![0u8; DexLayout::compute(policy, catalog).total_len]
    }

    #[test]
    fn mark_all_seen_respects_sex_restrictions() {
        let policy = policy();
        let catalog = catalog();
        let mut data = buffer(&policy, &catalog);
        let mut ledger = DexLedger::new(&mut data, 0, policy, &catalog).unwrap();
        BulkOperator::new(&mut ledger, Language::English.code())
            .mark_all_seen(false)
            .unwrap();

        let female_only = ledger.gender_flags(7).unwrap();
        assert!(!female_only.male && female_only.female);
        let male_only = ledger.gender_flags(8).unwrap();
        assert!(male_only.male && !male_only.female);
        let unrestricted = ledger.gender_flags(1).unwrap();
        assert!(unrestricted.male && unrestricted.female);
        assert!(!unrestricted.male_shiny && !unrestricted.female_shiny);
        assert_eq!(ledger.seen_count(), 20);
    }

    #[test]
    fn mark_all_seen_keeps_caught_entries_caught() {
        let policy = policy();
        let catalog = catalog();
        let mut data = buffer(&policy, &catalog);
        let mut ledger = DexLedger::new(&mut data, 0, policy, &catalog).unwrap();
        ledger.set_state(5, EntryState::Caught).unwrap();

        BulkOperator::new(&mut ledger, Language::English.code())
            .mark_all_seen(true)
            .unwrap();
        assert_eq!(ledger.state(5).unwrap(), EntryState::Caught);
        let flags = ledger.gender_flags(5).unwrap();
        assert!(flags.male_shiny && flags.female_shiny);
    }

    #[test]
    fn caught_all_reaches_entities_past_language_bound() {
        let policy = policy();
        let catalog = catalog();
        let mut data = buffer(&policy, &catalog);
        let mut ledger = DexLedger::new(&mut data, 0, policy, &catalog).unwrap();
        let lang = Language::German.code();
        BulkOperator::new(&mut ledger, lang)
            .mark_all_caught(false)
            .unwrap();

        // The loop must not stop at the legacy language bound (10): every
        // entity up to max_id gets its state written.
        assert_eq!(ledger.caught_count(), 20);
        assert_eq!(ledger.state(20).unwrap(), EntryState::Caught);
        assert!(ledger.language_flag(10, lang).unwrap());
        assert!(!ledger.language_flag(11, lang).unwrap());
    }

    #[test]
    fn caught_none_downgrades_and_clears_languages() {
        let policy = policy();
        let catalog = catalog();
        let mut data = buffer(&policy, &catalog);
        let mut ledger = DexLedger::new(&mut data, 0, policy, &catalog).unwrap();
        let lang = Language::English.code();
        BulkOperator::new(&mut ledger, lang)
            .mark_all_caught(false)
            .unwrap();
        ledger.set_state(2, EntryState::Seen).unwrap();

        BulkOperator::new(&mut ledger, lang).caught_none().unwrap();
        assert_eq!(ledger.caught_count(), 0);
        assert_eq!(ledger.seen_count(), 20);
        assert_eq!(ledger.language_mask(4).unwrap(), LANGUAGE_NONE);
        // Seen flags survive the downgrade.
        assert!(ledger.gender_flags(1).unwrap().male);
    }

    #[test]
    fn complete_entry_populates_forms_and_languages() {
        let policy = policy();
        let catalog = catalog();
        let mut data = buffer(&policy, &catalog);
        let mut ledger = DexLedger::new(&mut data, 0, policy, &catalog).unwrap();
        BulkOperator::new(&mut ledger, Language::English.code())
            .complete_entry(3, true)
            .unwrap();

        assert_eq!(ledger.state(3).unwrap(), EntryState::Caught);
        for form in 0..2 {
            assert!(ledger.form_flag(3, form, false).unwrap());
            assert!(ledger.form_flag(3, form, true).unwrap());
        }
        assert_eq!(ledger.language_mask(3).unwrap(), LANGUAGE_ALL);
    }

    #[test]
    fn complete_entry_without_shiny_leaves_shiny_planes_clear() {
        let policy = policy();
        let catalog = catalog();
        let mut data = buffer(&policy, &catalog);
        let mut ledger = DexLedger::new(&mut data, 0, policy, &catalog).unwrap();
        BulkOperator::new(&mut ledger, Language::English.code())
            .complete_entry(3, false)
            .unwrap();

        assert!(ledger.form_flag(3, 0, false).unwrap());
        assert!(!ledger.form_flag(3, 0, true).unwrap());
        let flags = ledger.gender_flags(3).unwrap();
        assert!(flags.male && flags.female);
        assert!(!flags.male_shiny && !flags.female_shiny);
    }

    #[test]
    fn complete_all_covers_the_whole_range() {
        let policy = policy();
        let catalog = catalog();
        let mut data = buffer(&policy, &catalog);
        let mut ledger = DexLedger::new(&mut data, 0, policy, &catalog).unwrap();
        BulkOperator::new(&mut ledger, Language::English.code())
            .complete_all(false)
            .unwrap();

        assert_eq!(ledger.caught_count(), 20);
        assert_eq!(ledger.language_mask(10).unwrap(), LANGUAGE_ALL);
        assert_eq!(ledger.language_mask(11).unwrap(), LANGUAGE_NONE);
        assert!(ledger.form_flag(3, 1, false).unwrap());
    }

    #[test]
    fn clear_all_zeroes_the_region() {
        let policy = policy();
        let catalog = catalog();
        let mut data = buffer(&policy, &catalog);
        let mut ledger = DexLedger::new(&mut data, 0, policy, &catalog).unwrap();
        let lang = Language::English.code();
        BulkOperator::new(&mut ledger, lang)
            .complete_all(true)
            .unwrap();
        BulkOperator::new(&mut ledger, lang).clear_all().unwrap();

        drop(ledger);
        assert!(data.iter().all(|&b| b == 0));
    }
}
