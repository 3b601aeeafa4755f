//! Lexical gate for bio-relevance: a fast vocabulary check that decides
//! whether a record plausibly touches biosecurity-sensitive domains before
//! any model call is made.

use crate::models::Sector;

/// Terms indicating possible relevance to hospitals, labs, biomanufacturing,
/// pharma or food/agriculture. Matched case-insensitively as substrings.
pub const BIO_KEYWORDS: &[&str] = &[
    // Hospitals & clinical care
    "medical",
    "hospital",
    "patient",
    "clinical",
    "healthcare",
    "health record",
    "ehr",
    "emr",
    "medical device",
    "infusion pump",
    "ventilator",
    "pacemaker",
    "imaging",
    "radiology",
    "pacs",
    "dicom",
    "hl7",
    "fhir",
    "telemedicine",
    "nurse call",
    // Laboratories & diagnostics
    "laboratory",
    "lab equipment",
    "lims",
    "diagnostic",
    "assay",
    "specimen",
    "centrifuge",
    "autoclave",
    "sequencer",
    "sequencing",
    "pcr",
    "genomic",
    "dna synthesis",
    "biosafety",
    "biocontainment",
    "pathogen",
    "microbiology",
    // Biomanufacturing & biotech
    "biotech",
    "biotechnology",
    "bioreactor",
    "fermentation",
    "biomanufacturing",
    "bioprocess",
    "gmp",
    "cleanroom",
    "batch record",
    // Pharmaceutical
    "vaccine",
    "pharmaceutical",
    "pharma",
    "drug manufacturing",
    "formulation",
    "clinical trial",
    "medication",
    "prescription",
    "pharmacy",
    // Food & agriculture
    "food processing",
    "food safety",
    "agriculture",
    "agricultural",
    "livestock",
    "veterinary",
    "crop",
    "irrigation",
    "pesticide",
    "cold chain",
];

/// Substring rules mapping a matched keyword to its sector label. First rule
/// that matches wins; more specific rules come first.
const SECTOR_RULES: &[(&str, Sector)] = &[
    ("clinical trial", Sector::Pharmaceutical),
    ("lab equipment", Sector::ClinicalLabs),
    ("hospital", Sector::Hospitals),
    ("patient", Sector::Hospitals),
    ("medical", Sector::Hospitals),
    ("health", Sector::Hospitals),
    ("ehr", Sector::Hospitals),
    ("emr", Sector::Hospitals),
    ("infusion", Sector::Hospitals),
    ("ventilator", Sector::Hospitals),
    ("pacemaker", Sector::Hospitals),
    ("imaging", Sector::Hospitals),
    ("radiology", Sector::Hospitals),
    ("pacs", Sector::Hospitals),
    ("dicom", Sector::Hospitals),
    ("hl7", Sector::Hospitals),
    ("fhir", Sector::Hospitals),
    ("telemedicine", Sector::Hospitals),
    ("nurse", Sector::Hospitals),
    ("clinical", Sector::ClinicalLabs),
    ("laborator", Sector::ClinicalLabs),
    ("lims", Sector::ClinicalLabs),
    ("diagnostic", Sector::ClinicalLabs),
    ("assay", Sector::ClinicalLabs),
    ("specimen", Sector::ClinicalLabs),
    ("centrifuge", Sector::ClinicalLabs),
    ("autoclave", Sector::ClinicalLabs),
    ("sequenc", Sector::Research),
    ("pcr", Sector::Research),
    ("genomic", Sector::Research),
    ("dna", Sector::Research),
    ("biosafety", Sector::Research),
    ("biocontainment", Sector::Research),
    ("pathogen", Sector::Research),
    ("microbiolog", Sector::Research),
    ("bioreactor", Sector::Biomanufacturing),
    ("fermentation", Sector::Biomanufacturing),
    ("biomanufactur", Sector::Biomanufacturing),
    ("bioprocess", Sector::Biomanufacturing),
    ("gmp", Sector::Biomanufacturing),
    ("cleanroom", Sector::Biomanufacturing),
    ("batch record", Sector::Biomanufacturing),
    ("biotech", Sector::Biomanufacturing),
    ("vaccine", Sector::Pharmaceutical),
    ("pharma", Sector::Pharmaceutical),
    ("drug", Sector::Pharmaceutical),
    ("formulation", Sector::Pharmaceutical),
    ("medication", Sector::Pharmaceutical),
    ("prescription", Sector::Pharmaceutical),
    ("food", Sector::FoodAgriculture),
    ("agricultur", Sector::FoodAgriculture),
    ("livestock", Sector::FoodAgriculture),
    ("veterinary", Sector::FoodAgriculture),
    ("crop", Sector::FoodAgriculture),
    ("irrigation", Sector::FoodAgriculture),
    ("pesticide", Sector::FoodAgriculture),
    ("cold chain", Sector::FoodAgriculture),
];

/// All vocabulary terms found in the text, case-insensitively.
pub fn find_matches(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    BIO_KEYWORDS.iter().copied().filter(|k| lower.contains(k)).collect()
}

/// Sector labels derived from matched keywords, deduplicated in rule order.
pub fn sectors_for(matches: &[&str]) -> Vec<Sector> {
    let mut sectors = Vec::new();
    for keyword in matches {
        for (needle, sector) in SECTOR_RULES {
            if keyword.contains(needle) {
                if !sectors.contains(sector) {
                    sectors.push(*sector);
                }
                break;
            }
        }
    }
    sectors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_matches_for_generic_text() {
        let matches = find_matches("Buffer overflow in router firmware allows remote code execution");
        assert!(matches.is_empty());
    }

    #[test]
    fn test_matches_are_case_insensitive() {
        let matches = find_matches("Vulnerability in HOSPITAL Laboratory equipment");
        assert!(matches.contains(&"hospital"));
        assert!(matches.contains(&"laboratory"));
    }

    #[test]
    fn test_example_description_maps_to_hospitals_and_labs() {
        let matches = find_matches("Medical device vulnerability in hospital laboratory equipment");
        assert!(!matches.is_empty());

        let sectors = sectors_for(&matches);
        assert!(sectors.contains(&Sector::Hospitals));
        assert!(sectors.contains(&Sector::ClinicalLabs));
    }

    #[test]
    fn test_sector_mapping_pharma_and_food() {
        let matches = find_matches("Flaw in vaccine cold chain monitoring for food processing plants");
        let sectors = sectors_for(&matches);
        assert!(sectors.contains(&Sector::Pharmaceutical));
        assert!(sectors.contains(&Sector::FoodAgriculture));
    }

    #[test]
    fn test_sectors_deduplicated() {
        let matches = find_matches("hospital patient medical imaging");
        let sectors = sectors_for(&matches);
        assert_eq!(sectors, vec![Sector::Hospitals]);
    }
}
