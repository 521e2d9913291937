//! Canonical vocabularies: states, crops, districts, categories, column names.
//!
//! The built-in tables are the defaults of [`Vocabulary`]; a YAML engine
//! config can replace any of them. A `Vocabulary` is plain data, read-only
//! once the engine is built.

use crate::types::CropCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw column name variants per canonical field, in priority order.
///
/// Variants are compared after [`crate::normalize::normalize_column_name`],
/// so `crop_year`, `Crop Year` and `crop-year` all match `"crop year"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnVariants {
    pub state: Vec<String>,
    pub district: Vec<String>,
    pub crop: Vec<String>,
    pub year: Vec<String>,
    pub production: Vec<String>,
    pub rainfall: Vec<String>,
}

impl Default for ColumnVariants {
    fn default() -> Self {
        Self {
            state: strings(&["state", "state name", "statename", "state ut", "subdivision"]),
            district: strings(&["district", "district name", "districtname"]),
            crop: strings(&["crop", "crop name", "cropname", "commodity"]),
            year: strings(&[
                "year",
                "crop year",
                "season year",
                "financial year",
                "fiscal year",
                "yr",
            ]),
            production: strings(&[
                "production",
                "production tonnes",
                "prod tonnes",
                "prod",
                "quantity",
                "output",
            ]),
            rainfall: strings(&[
                "annual rainfall",
                "rainfall mm",
                "annual rainfall mm",
                "rainfall",
                "total rainfall",
                "annual",
                "precipitation",
                "rain",
            ]),
        }
    }
}

/// All lookup tables used by normalization, extraction and policy synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Vocabulary {
    /// Canonical state and union territory names
    pub states: Vec<String>,

    /// Lower-case spelling variant -> canonical state
    pub state_aliases: BTreeMap<String, String>,

    /// Canonical crop names
    pub crops: Vec<String>,

    /// Lower-case crop alias -> canonical crop
    pub crop_aliases: BTreeMap<String, String>,

    /// Group word (e.g., "millets") -> member crops
    pub crop_groups: BTreeMap<String, Vec<String>>,

    /// Districts recognised in free text without a "district" suffix
    pub districts: Vec<String>,

    /// Canonical crop -> category
    pub crop_categories: BTreeMap<String, CropCategory>,

    /// Phrases naming a category in a question
    pub category_terms: BTreeMap<String, CropCategory>,

    /// Raw column name variants
    pub columns: ColumnVariants,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            states: strings(CANONICAL_STATES),
            state_aliases: pairs(STATE_ALIASES),
            crops: strings(CROPS),
            crop_aliases: pairs(CROP_ALIASES),
            crop_groups: CROP_GROUPS
                .iter()
                .map(|(group, crops)| (group.to_string(), strings(crops)))
                .collect(),
            districts: strings(DISTRICTS),
            crop_categories: CROP_CATEGORIES
                .iter()
                .map(|(crop, category)| (crop.to_string(), *category))
                .collect(),
            category_terms: CATEGORY_TERMS
                .iter()
                .map(|(term, category)| (term.to_string(), *category))
                .collect(),
            columns: ColumnVariants::default(),
        }
    }
}

impl Vocabulary {
    /// Lower-case every alias key so lookups stay case-insensitive
    /// regardless of how a config file spelled them.
    pub fn normalized(mut self) -> Self {
        self.state_aliases = self
            .state_aliases
            .into_iter()
            .map(|(k, v)| (lookup_key(&k), v))
            .collect();
        self.crop_aliases = self
            .crop_aliases
            .into_iter()
            .map(|(k, v)| (lookup_key(&k), v))
            .collect();
        self.crop_groups = self
            .crop_groups
            .into_iter()
            .map(|(k, v)| (lookup_key(&k), v))
            .collect();
        self.category_terms = self
            .category_terms
            .into_iter()
            .map(|(k, v)| (lookup_key(&k), v))
            .collect();
        self
    }

    /// Map a raw state spelling to its canonical name.
    ///
    /// Unknown names come back trimmed but otherwise unchanged.
    pub fn canonical_state(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        let key = lookup_key(trimmed);

        if let Some(canonical) = self.state_aliases.get(&key) {
            return canonical.clone();
        }

        self.states
            .iter()
            .find(|s| lookup_key(s) == key)
            .cloned()
            .unwrap_or_else(|| trimmed.to_string())
    }

    /// Map a raw crop spelling to its canonical name.
    pub fn canonical_crop(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        let key = lookup_key(trimmed);

        if let Some(canonical) = self.crop_aliases.get(&key) {
            return canonical.clone();
        }

        self.crops
            .iter()
            .find(|c| lookup_key(c) == key)
            .cloned()
            .unwrap_or_else(|| trimmed.to_string())
    }

    /// True when the name is one of the canonical states.
    pub fn is_state(&self, name: &str) -> bool {
        let key = lookup_key(name);
        self.states.iter().any(|s| lookup_key(s) == key)
    }

    /// Category of a crop, if the category table knows it.
    pub fn category_of(&self, crop: &str) -> Option<CropCategory> {
        let canonical = self.canonical_crop(crop);
        self.crop_categories.get(&canonical).copied()
    }
}

/// Canonical lookup key: trimmed, lower-case, single-spaced.
pub fn lookup_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn pairs(items: &[(&str, &str)]) -> BTreeMap<String, String> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

const CANONICAL_STATES: &[&str] = &[
    "Andaman and Nicobar Islands",
    "Andhra Pradesh",
    "Arunachal Pradesh",
    "Assam",
    "Bihar",
    "Chandigarh",
    "Chhattisgarh",
    "Dadra and Nagar Haveli and Daman and Diu",
    "Delhi",
    "Goa",
    "Gujarat",
    "Haryana",
    "Himachal Pradesh",
    "Jammu and Kashmir",
    "Jharkhand",
    "Karnataka",
    "Kerala",
    "Ladakh",
    "Lakshadweep",
    "Madhya Pradesh",
    "Maharashtra",
    "Manipur",
    "Meghalaya",
    "Mizoram",
    "Nagaland",
    "Odisha",
    "Puducherry",
    "Punjab",
    "Rajasthan",
    "Sikkim",
    "Tamil Nadu",
    "Telangana",
    "Tripura",
    "Uttar Pradesh",
    "Uttarakhand",
    "West Bengal",
];

const STATE_ALIASES: &[(&str, &str)] = &[
    ("andaman & nicobar islands", "Andaman and Nicobar Islands"),
    ("andaman and nicobar", "Andaman and Nicobar Islands"),
    ("andaman & nicobar", "Andaman and Nicobar Islands"),
    ("a & n islands", "Andaman and Nicobar Islands"),
    ("a&n islands", "Andaman and Nicobar Islands"),
    ("a.p.", "Andhra Pradesh"),
    ("ap", "Andhra Pradesh"),
    ("arunachal", "Arunachal Pradesh"),
    ("chattisgarh", "Chhattisgarh"),
    ("chhatisgarh", "Chhattisgarh"),
    ("cg", "Chhattisgarh"),
    ("dadra & nagar haveli", "Dadra and Nagar Haveli and Daman and Diu"),
    ("dadra and nagar haveli", "Dadra and Nagar Haveli and Daman and Diu"),
    ("daman & diu", "Dadra and Nagar Haveli and Daman and Diu"),
    ("daman and diu", "Dadra and Nagar Haveli and Daman and Diu"),
    ("dnh and dd", "Dadra and Nagar Haveli and Daman and Diu"),
    ("nct of delhi", "Delhi"),
    ("new delhi", "Delhi"),
    ("delhi nct", "Delhi"),
    ("gujrat", "Gujarat"),
    ("h.p.", "Himachal Pradesh"),
    ("hp", "Himachal Pradesh"),
    ("jammu & kashmir", "Jammu and Kashmir"),
    ("j&k", "Jammu and Kashmir"),
    ("j & k", "Jammu and Kashmir"),
    ("jammu kashmir", "Jammu and Kashmir"),
    ("karnatak", "Karnataka"),
    ("m.p.", "Madhya Pradesh"),
    ("mp", "Madhya Pradesh"),
    ("maharastra", "Maharashtra"),
    ("mh", "Maharashtra"),
    ("orissa", "Odisha"),
    ("odisa", "Odisha"),
    ("pondicherry", "Puducherry"),
    ("pondichery", "Puducherry"),
    ("panjab", "Punjab"),
    ("pb", "Punjab"),
    ("rj", "Rajasthan"),
    ("t.n.", "Tamil Nadu"),
    ("tn", "Tamil Nadu"),
    ("tamilnadu", "Tamil Nadu"),
    ("telengana", "Telangana"),
    ("ts", "Telangana"),
    ("u.p.", "Uttar Pradesh"),
    ("up", "Uttar Pradesh"),
    ("uttaranchal", "Uttarakhand"),
    ("uttrakhand", "Uttarakhand"),
    ("uk", "Uttarakhand"),
    ("w.b.", "West Bengal"),
    ("wb", "West Bengal"),
    ("westbengal", "West Bengal"),
    ("hr", "Haryana"),
    ("br", "Bihar"),
    ("jh", "Jharkhand"),
    ("ka", "Karnataka"),
    ("kl", "Kerala"),
    ("gj", "Gujarat"),
    ("as", "Assam"),
    ("ga", "Goa"),
    ("ladak", "Ladakh"),
    ("laccadives", "Lakshadweep"),
    ("haryana state", "Haryana"),
    // IMD meteorological subdivisions, mapped to their primary state.
    ("punjab and chandigarh", "Punjab"),
    ("punjab & chandigarh", "Punjab"),
    ("haryana delhi & chandigarh", "Haryana"),
    ("haryana, delhi & chandigarh", "Haryana"),
    ("haryana delhi and chandigarh", "Haryana"),
    ("assam & meghalaya", "Assam"),
    ("assam and meghalaya", "Assam"),
    ("naga mani mizo tripura", "Nagaland"),
    ("sub himalayan west bengal & sikkim", "West Bengal"),
    ("sub-himalayan west bengal & sikkim", "West Bengal"),
    ("gangetic west bengal", "West Bengal"),
    ("east uttar pradesh", "Uttar Pradesh"),
    ("west uttar pradesh", "Uttar Pradesh"),
    ("east madhya pradesh", "Madhya Pradesh"),
    ("west madhya pradesh", "Madhya Pradesh"),
    ("east rajasthan", "Rajasthan"),
    ("west rajasthan", "Rajasthan"),
    ("gujarat region", "Gujarat"),
    ("saurashtra & kutch", "Gujarat"),
    ("saurashtra and kutch", "Gujarat"),
    ("konkan & goa", "Maharashtra"),
    ("madhya maharashtra", "Maharashtra"),
    ("marathwada", "Maharashtra"),
    ("vidarbha", "Maharashtra"),
    ("coastal andhra pradesh", "Andhra Pradesh"),
    ("rayalaseema", "Andhra Pradesh"),
    ("rayalseema", "Andhra Pradesh"),
    ("coastal karnataka", "Karnataka"),
    ("north interior karnataka", "Karnataka"),
    ("south interior karnataka", "Karnataka"),
    ("tamil nadu & pondicherry", "Tamil Nadu"),
];

const CROPS: &[&str] = &[
    "Rice",
    "Wheat",
    "Maize",
    "Jowar",
    "Bajra",
    "Ragi",
    "Tur",
    "Gram",
    "Groundnut",
    "Soybean",
    "Sunflower",
    "Mustard",
    "Cotton",
    "Sugarcane",
    "Jute",
    "Potato",
    "Onion",
    "Banana",
    "Tea",
    "Coffee",
];

const CROP_ALIASES: &[(&str, &str)] = &[
    ("paddy", "Rice"),
    ("arhar", "Tur"),
    ("pigeon pea", "Tur"),
    ("chana", "Gram"),
    ("chickpea", "Gram"),
    ("nachni", "Ragi"),
    ("finger millet", "Ragi"),
    ("pearl millet", "Bajra"),
    ("sorghum", "Jowar"),
    ("corn", "Maize"),
    ("soyabean", "Soybean"),
    ("soya", "Soybean"),
    ("sugar cane", "Sugarcane"),
    ("peanut", "Groundnut"),
    ("rapeseed", "Mustard"),
];

const CROP_GROUPS: &[(&str, &[&str])] = &[
    ("millets", &["Bajra", "Jowar", "Ragi"]),
    ("pulses", &["Tur", "Gram"]),
    ("oilseeds", &["Groundnut", "Soybean", "Sunflower", "Mustard"]),
    ("coarse cereals", &["Jowar", "Bajra", "Maize"]),
    ("cereals", &["Rice", "Wheat", "Maize"]),
];

const DISTRICTS: &[&str] = &[
    "Amritsar",
    "Ludhiana",
    "Bathinda",
    "Patiala",
    "Sangrur",
    "Jalandhar",
    "Karnal",
    "Kurukshetra",
    "Hisar",
    "Sirsa",
    "Ambala",
    "Panipat",
    "Nashik",
    "Pune",
    "Nagpur",
    "Solapur",
    "Belagavi",
    "Mysuru",
    "Guntur",
    "Warangal",
    "Bardhaman",
    "Thanjavur",
    "Jodhpur",
    "Indore",
];

const CROP_CATEGORIES: &[(&str, CropCategory)] = &[
    ("Bajra", CropCategory::DroughtResistant),
    ("Jowar", CropCategory::DroughtResistant),
    ("Ragi", CropCategory::DroughtResistant),
    ("Groundnut", CropCategory::DroughtResistant),
    ("Tur", CropCategory::DroughtResistant),
    ("Gram", CropCategory::DroughtResistant),
    ("Mustard", CropCategory::DroughtResistant),
    ("Rice", CropCategory::WaterIntensive),
    ("Sugarcane", CropCategory::WaterIntensive),
    ("Cotton", CropCategory::WaterIntensive),
    ("Banana", CropCategory::WaterIntensive),
    ("Jute", CropCategory::WaterIntensive),
];

const CATEGORY_TERMS: &[(&str, CropCategory)] = &[
    ("drought-resistant", CropCategory::DroughtResistant),
    ("drought resistant", CropCategory::DroughtResistant),
    ("drought-tolerant", CropCategory::DroughtResistant),
    ("drought tolerant", CropCategory::DroughtResistant),
    ("drought-hardy", CropCategory::DroughtResistant),
    ("dryland", CropCategory::DroughtResistant),
    ("water-intensive", CropCategory::WaterIntensive),
    ("water intensive", CropCategory::WaterIntensive),
    ("water-hungry", CropCategory::WaterIntensive),
    ("water hungry", CropCategory::WaterIntensive),
    ("water-guzzling", CropCategory::WaterIntensive),
    ("thirsty", CropCategory::WaterIntensive),
];
