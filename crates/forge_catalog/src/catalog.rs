//! # The Catalog
//!
//! Read-only game data the engine consults: item, scroll and offering
//! definitions plus the two base chance tables.
//!
//! ## Loading
//!
//! ```rust,ignore
//! let catalog = Catalog::from_path("data/catalog.toml")?;
//! let pinkie = catalog.item_definition("pinkie")?;
//! assert_eq!(catalog.zero_grade("pinkie")?, 0);
//! ```
//!
//! Everything the engine can ask for during a chain is checked by
//! [`Catalog::new`], so lookups on a loaded catalog only fail for names or
//! tiers the catalog never defined.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::definitions::{ItemDefinition, Mechanic, OfferingDefinition, ScrollDefinition};
use crate::error::{CatalogError, CatalogResult};
use crate::grade::{ZeroGradeCache, MAX_GRADE, ZERO_GRADES};
use crate::tables::BaseChanceTable;

/// Highest scroll tier. Tiers below it are required for both mechanics.
pub const MAX_SCROLL_TIER: u8 = 4;

/// Highest offering tier. Tier 0 stands for "no offering".
pub const MAX_OFFERING_TIER: u8 = 3;

/// The bundled catalog document.
const BUILTIN_CATALOG: &str = include_str!("../data/catalog.toml");

/// Read access to catalog data, as required by the engine.
pub trait CatalogLookup {
    /// Definition of the named item.
    ///
    /// # Errors
    ///
    /// [`CatalogError::UnknownItem`] if the item is not in the catalog.
    fn item_definition(&self, name: &str) -> CatalogResult<&ItemDefinition>;

    /// Scroll of `tier` for `mechanic`. `Ok(None)` means the tier is an
    /// absent placeholder that can never be used.
    ///
    /// # Errors
    ///
    /// [`CatalogError::UnknownScroll`] for a tier the catalog must define but
    /// does not, or a tier above [`MAX_SCROLL_TIER`].
    fn scroll_definition(
        &self,
        mechanic: Mechanic,
        tier: u8,
    ) -> CatalogResult<Option<&ScrollDefinition>>;

    /// Offering of `tier`. Tier 0 is "no offering" and yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// [`CatalogError::UnknownOffering`] for an undefined tier.
    fn offering_definition(&self, tier: u8) -> CatalogResult<Option<&OfferingDefinition>>;

    /// Base chance table for `mechanic`.
    fn base_chance_table(&self, mechanic: Mechanic) -> &BaseChanceTable;

    /// Grade of the named item at level 0, memoized.
    ///
    /// # Errors
    ///
    /// [`CatalogError::UnknownItem`] if the item is not in the catalog.
    fn zero_grade(&self, name: &str) -> CatalogResult<u8>;

    /// Grade of the named item at `level`.
    ///
    /// # Errors
    ///
    /// [`CatalogError::UnknownItem`] if the item is not in the catalog.
    fn grade(&self, name: &str, level: u32) -> CatalogResult<u8> {
        Ok(self.item_definition(name)?.grade(level))
    }
}

/// Raw shape of a catalog TOML document.
#[derive(Clone, Debug, Deserialize)]
pub struct CatalogDocument {
    /// Enhanceable items.
    pub items: Vec<ItemDefinition>,
    /// Scrolls for both mechanics.
    pub scrolls: Vec<ScrollDefinition>,
    /// Offerings, tiers 1-3.
    pub offerings: Vec<OfferingDefinition>,
    /// Base chance tables.
    pub chances: ChanceDocument,
}

/// Raw rows of both base chance tables.
#[derive(Clone, Debug, Deserialize)]
pub struct ChanceDocument {
    /// Upgrade rows, one per zero grade.
    pub upgrade: Vec<Vec<f64>>,
    /// Compound rows, one per zero grade.
    pub compound: Vec<Vec<f64>>,
}

/// Validated, immutable catalog.
#[derive(Debug)]
pub struct Catalog {
    items: HashMap<String, ItemDefinition>,
    scrolls: HashMap<(Mechanic, u8), ScrollDefinition>,
    offerings: HashMap<u8, OfferingDefinition>,
    upgrade_chances: BaseChanceTable,
    compound_chances: BaseChanceTable,
    zero_grades: ZeroGradeCache,
}

impl Catalog {
    /// Builds and validates a catalog from a parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidConfig`] on duplicate definitions,
    /// missing scroll or offering tiers, malformed chance tables, or an item
    /// whose level range reaches past its mechanic's chance table.
    pub fn new(document: CatalogDocument) -> CatalogResult<Self> {
        let upgrade_chances = BaseChanceTable::new(Mechanic::Upgrade, document.chances.upgrade)?;
        let compound_chances =
            BaseChanceTable::new(Mechanic::Compound, document.chances.compound)?;

        let mut scrolls = HashMap::new();
        for scroll in document.scrolls {
            if scroll.tier > MAX_SCROLL_TIER {
                return Err(CatalogError::InvalidConfig(format!(
                    "{} scroll tier {} above {MAX_SCROLL_TIER}",
                    scroll.mechanic, scroll.tier
                )));
            }
            if scroll.price.is_nan() || scroll.price < 0.0 {
                return Err(CatalogError::InvalidConfig(format!(
                    "{} scroll tier {} has price {}",
                    scroll.mechanic, scroll.tier, scroll.price
                )));
            }
            let key = (scroll.mechanic, scroll.tier);
            if scrolls.insert(key, scroll).is_some() {
                return Err(CatalogError::InvalidConfig(format!(
                    "duplicate {} scroll tier {}",
                    key.0, key.1
                )));
            }
        }
        for mechanic in [Mechanic::Upgrade, Mechanic::Compound] {
            for tier in 0..MAX_SCROLL_TIER {
                if !scrolls.contains_key(&(mechanic, tier)) {
                    return Err(CatalogError::InvalidConfig(format!(
                        "missing {mechanic} scroll tier {tier}"
                    )));
                }
            }
        }

        let mut offerings = HashMap::new();
        for offering in document.offerings {
            if offering.tier == 0 || offering.tier > MAX_OFFERING_TIER {
                return Err(CatalogError::InvalidConfig(format!(
                    "offering tier {} outside 1..={MAX_OFFERING_TIER}",
                    offering.tier
                )));
            }
            if !offering.price.is_finite() || offering.price < 0.0 {
                return Err(CatalogError::InvalidConfig(format!(
                    "offering tier {} has price {}",
                    offering.tier, offering.price
                )));
            }
            let tier = offering.tier;
            if offerings.insert(tier, offering).is_some() {
                return Err(CatalogError::InvalidConfig(format!(
                    "duplicate offering tier {tier}"
                )));
            }
        }
        for tier in 1..=MAX_OFFERING_TIER {
            if !offerings.contains_key(&tier) {
                return Err(CatalogError::InvalidConfig(format!(
                    "missing offering tier {tier}"
                )));
            }
        }

        let mut items = HashMap::new();
        for item in document.items {
            Self::validate_item(&item, &upgrade_chances, &compound_chances)?;
            let name = item.name.clone();
            if items.insert(name.clone(), item).is_some() {
                return Err(CatalogError::InvalidConfig(format!("duplicate item {name}")));
            }
        }

        tracing::info!(
            "Catalog loaded: {} items, {} scrolls, {} offerings",
            items.len(),
            scrolls.len(),
            offerings.len()
        );

        Ok(Self {
            items,
            scrolls,
            offerings,
            upgrade_chances,
            compound_chances,
            zero_grades: ZeroGradeCache::new(),
        })
    }

    /// Parses and validates a catalog from TOML text.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Parse`] for malformed TOML, otherwise as [`Catalog::new`].
    pub fn from_toml_str(text: &str) -> CatalogResult<Self> {
        let document: CatalogDocument = toml::from_str(text)?;
        Self::new(document)
    }

    /// Reads, parses and validates a catalog file.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Io`] if the file cannot be read, otherwise as
    /// [`Catalog::from_toml_str`].
    pub fn from_path(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// The catalog bundled with this crate.
    ///
    /// # Errors
    ///
    /// Only if the bundled document itself is broken.
    pub fn builtin() -> CatalogResult<Self> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    /// Replaces the zero-grade cache, e.g. with one shared across reloads.
    ///
    /// Entries for items this catalog does not define, or whose grade
    /// disagrees with this catalog's definition, are dropped.
    #[must_use]
    pub fn with_zero_grade_cache(mut self, cache: ZeroGradeCache) -> Self {
        let items = &self.items;
        cache.retain(|name, grade| items.get(name).is_some_and(|item| item.grade(0) == grade));
        self.zero_grades = cache;
        self
    }

    /// The zero-grade cache owned by this catalog.
    #[must_use]
    pub const fn zero_grade_cache(&self) -> &ZeroGradeCache {
        &self.zero_grades
    }

    /// All items, in no particular order.
    pub fn items(&self) -> impl Iterator<Item = &ItemDefinition> {
        self.items.values()
    }

    /// Checks that every attempt the item can make has a base chance entry.
    fn validate_item(
        item: &ItemDefinition,
        upgrade_chances: &BaseChanceTable,
        compound_chances: &BaseChanceTable,
    ) -> CatalogResult<()> {
        if item.grades.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(CatalogError::InvalidConfig(format!(
                "item {} has descending grades {:?}",
                item.name, item.grades
            )));
        }
        if !item.price.is_finite() || item.price < 0.0 {
            return Err(CatalogError::InvalidConfig(format!(
                "item {} has price {}",
                item.name, item.price
            )));
        }

        let table = match item.mechanic {
            Mechanic::Upgrade => upgrade_chances,
            Mechanic::Compound => compound_chances,
        };
        if item.max_level() > table.max_level() {
            return Err(CatalogError::InvalidConfig(format!(
                "item {} reaches level {} but the {} table stops at {}",
                item.name,
                item.max_level(),
                item.mechanic,
                table.max_level()
            )));
        }
        for level in 0..item.max_level() {
            let row = item.chance_row(level);
            if usize::from(row) >= ZERO_GRADES {
                return Err(CatalogError::InvalidConfig(format!(
                    "item {} at level {level} reads chance row {row}, only grades below {MAX_GRADE} have rows",
                    item.name
                )));
            }
        }
        Ok(())
    }
}

impl CatalogLookup for Catalog {
    fn item_definition(&self, name: &str) -> CatalogResult<&ItemDefinition> {
        self.items
            .get(name)
            .ok_or_else(|| CatalogError::UnknownItem(name.to_string()))
    }

    fn scroll_definition(
        &self,
        mechanic: Mechanic,
        tier: u8,
    ) -> CatalogResult<Option<&ScrollDefinition>> {
        match self.scrolls.get(&(mechanic, tier)) {
            Some(scroll) => Ok(Some(scroll)),
            None if tier == MAX_SCROLL_TIER => Ok(None),
            None => Err(CatalogError::UnknownScroll { mechanic, tier }),
        }
    }

    fn offering_definition(&self, tier: u8) -> CatalogResult<Option<&OfferingDefinition>> {
        if tier == 0 {
            return Ok(None);
        }
        self.offerings
            .get(&tier)
            .map(Some)
            .ok_or(CatalogError::UnknownOffering(tier))
    }

    fn base_chance_table(&self, mechanic: Mechanic) -> &BaseChanceTable {
        match mechanic {
            Mechanic::Upgrade => &self.upgrade_chances,
            Mechanic::Compound => &self.compound_chances,
        }
    }

    fn zero_grade(&self, name: &str) -> CatalogResult<u8> {
        let item = self.item_definition(name)?;
        Ok(self.zero_grades.get_or_classify(item))
    }
}
