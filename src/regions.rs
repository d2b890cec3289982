// City to delivery-region classification.
//
// The reference data is a fixed table of region -> city names. Lookups are
// exact matches on the trimmed city text; anything unknown lands in the
// `Other` bucket, which always sorts after the named regions.
use crate::error::{DispatchError, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// Delivery region a dispatch sheet section is printed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    Hawalli,
    Jahra,
    Farwaniya,
    SabahAlAhmad,
    SabahAlSalem,
    Fahaheel,
    /// Fallback for blank or unknown cities.
    Other,
}

impl Region {
    /// Named regions in lookup order, without the fallback.
    pub const KNOWN: [Region; 6] = [
        Region::Hawalli,
        Region::Jahra,
        Region::Farwaniya,
        Region::SabahAlAhmad,
        Region::SabahAlSalem,
        Region::Fahaheel,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Region::Hawalli => "منطقة حولي",
            Region::Jahra => "منطقة الجهراء",
            Region::Farwaniya => "منطقة الفروانية",
            Region::SabahAlAhmad => "منطقة صباح الأحمد",
            Region::SabahAlSalem => "منطقة صباح السالم",
            Region::Fahaheel => "منطقة الفحاحيل",
            Region::Other => "Other City",
        }
    }

    pub fn is_fallback(self) -> bool {
        self == Region::Other
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const HAWALLI: &[&str] = &[
    "جنوب السرة", "السالمية", "شرق", "حدائق السور", "مدينة الكويت", "المباركية",
    "الرميثية", "البدع", "بنيد القار", "ميدان حولي", "الدسمة", "دسمان",
    "الشامية", "كيفان", "القبلة", "ضاحية عبدالله السالم", "شرق\u{200e}", "حولي",
    "سلوى", "بيان", "مشرف", "مبارك العبدالله غرب مشرف", "الجابرية", "الشعب",
    "قرطبة", "اليرموك", "الخالدية", "العديلية", "الروضة", "النزهة", "الفيحاء",
    "القادسية", "الدعية", "المنصورية", "السرة",
];

const JAHRA: &[&str] = &[
    "الصليبخات", "الصليبية الصناعية", "النهضة / شرق الصليبخات",
    "جنوب الدوحة / القيروان", "الصليبية", "الدوحة", "شمال غرب الصليبيخات",
    "القيروان", "أمغرة", "كبد", "مدينة جابر الأحمد", "غرناطة",
    "مدينة سعد العبد الله", "جنوب امغرة", "النهضة", "القصر", "النعيم",
    "تيماء", "النسيم", "الجهراء المنطقة الصناعية", "العيون", "الواحة",
    "الجهراء", "المطلاع", "اسطبلات الجهراء", "العبدلي", "السكراب",
    "مزارع الطليبية",
];

const FARWANIYA: &[&str] = &[
    "الشويخ الصناعية", "المرقاب", "الشويخ", "الشويخ السكنية", "الفروانية",
    "حطين", "الشهداء", "الصديق", "صبحان", "الزهراء", "السلام", "الرابية",
    "العمرية", "غرب عبدالله المبارك", "عبدالله المبارك", "الضجيج",
    "خيطان", "جليب الشيوخ", "العباسية", "شارع محمد بن القاسم", "الحساوي",
    "الرحاب", "اشبيلية", "العارضية المنطقة الصناعية", "صباح الناصر",
    "الفردوس", "العارضية", "الأندلس", "الرقعي", "الري", "الافينيوز",
];

const SABAH_AL_AHMAD: &[&str] = &[
    "صباح الأحمد", "ام الهيمان", "علي صباح السالم", "مدينة صباح الأحمد",
    "الوفرة", "الشعيبة", "الخيران", "النويصب", "الزور",
];

const SABAH_AL_SALEM: &[&str] = &[
    "المسايل", "الأحمدي", "شمال الأحمدي", "جنوب الأحمدي", "شرق الأحمدي",
    "وسط الأحمدي", "أبو فطيرة", "أبو الحصانية", "المسيلة", "الفنيطيس",
    "صباح السالم", "العدان", "القصور", "اسواق القرين", "القرين", "مبارك الكبير",
];

const FAHAHEEL: &[&str] = &[
    "الفنطاس", "المهبولة", "أبو حليفة", "الفحيحيل", "الفحيحيل الصناعية",
    "الظهر", "المنقف", "جابر العلي", "العقيلة", "الرقة", "هدية", "فهد الأحمد",
    "الصباحية",
];

/// Region -> known city names, in lookup order.
pub static CITY_TABLE: &[(Region, &[&str])] = &[
    (Region::Hawalli, HAWALLI),
    (Region::Jahra, JAHRA),
    (Region::Farwaniya, FARWANIYA),
    (Region::SabahAlAhmad, SABAH_AL_AHMAD),
    (Region::SabahAlSalem, SABAH_AL_SALEM),
    (Region::Fahaheel, FAHAHEEL),
];

// Built once; the first region listing a city keeps it, which matches a
// linear scan of the table in lookup order.
static CITY_INDEX: Lazy<HashMap<&'static str, Region>> = Lazy::new(|| {
    let mut index = HashMap::new();
    for (region, cities) in CITY_TABLE {
        for city in cities.iter() {
            index.entry(*city).or_insert(*region);
        }
    }
    index
});

/// Map a raw city cell to its delivery region.
///
/// Blank or missing cities and names not present in the reference table
/// all classify as [`Region::Other`].
pub fn classify(city: Option<&str>) -> Region {
    let Some(city) = city.map(str::trim).filter(|c| !c.is_empty()) else {
        return Region::Other;
    };
    CITY_INDEX.get(city).copied().unwrap_or(Region::Other)
}

/// Check that no city string is listed under two regions.
pub fn validate_city_table(table: &[(Region, &[&'static str])]) -> Result<()> {
    let mut seen: HashMap<&str, Region> = HashMap::new();
    for (region, cities) in table {
        for city in cities.iter() {
            if let Some(first) = seen.insert(*city, *region) {
                return Err(DispatchError::DuplicateCity {
                    city: (*city).to_string(),
                    first: first.label(),
                    second: region.label(),
                });
            }
        }
    }
    Ok(())
}

pub fn known_city_count() -> usize {
    CITY_INDEX.len()
}
