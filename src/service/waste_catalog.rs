// service/waste_catalog.rs
//! Static guidance shown next to every classification result.

use crate::{
    dtos::classifydtos::ClassificationResponseDto,
    models::classificationmodel::WasteCategory,
    service::response_parser::RawClassification,
};

pub fn recycling_tips(category: WasteCategory) -> &'static [&'static str] {
    match category {
        WasteCategory::Plastic => &[
            "Remove caps and labels before recycling",
            "Rinse containers to remove food residue",
            "Check the recycling number on the bottom",
            "Avoid putting plastic bags in regular recycling bins",
        ],
        WasteCategory::Glass => &[
            "Remove metal caps and lids",
            "Rinse containers clean",
            "Separate by color if required locally",
            "Never mix with other glass types like windows or mirrors",
        ],
        WasteCategory::Metal => &[
            "Remove any plastic or paper labels",
            "Rinse food containers clean",
            "Crush aluminum cans to save space",
            "Separate ferrous and non-ferrous metals if required",
        ],
        WasteCategory::Paper => &[
            "Remove any plastic coating or tape",
            "Keep paper dry and clean",
            "Separate different paper types",
            "Avoid recycling paper with food contamination",
        ],
        WasteCategory::Organic => &[
            "Compost in your backyard or community program",
            "Remove any non-organic materials",
            "Keep separate from other waste types",
            "Consider vermicomposting for apartment living",
        ],
        WasteCategory::EWaste => &[
            "Take to certified e-waste recycling centers",
            "Remove personal data from devices",
            "Keep batteries separate",
            "Never put in regular trash due to toxic materials",
        ],
        WasteCategory::Biomedical => &[
            "Use designated medical waste disposal services",
            "Never put in regular trash or recycling",
            "Follow local healthcare facility guidelines",
            "Ensure proper containment to prevent contamination",
        ],
        WasteCategory::Unknown => &[
            "Check your local council's recycling guidelines",
            "When in doubt, keep it out of the recycling bin",
            "Try another photo with the item alone and well lit",
        ],
    }
}

pub fn disposal_method(category: WasteCategory) -> &'static str {
    match category {
        WasteCategory::Plastic => {
            "Place in recycling bin with plastic containers (check local guidelines for accepted types)"
        }
        WasteCategory::Glass => "Place in glass recycling bin or take to recycling center",
        WasteCategory::Metal => "Place in metal recycling bin or scrap metal collection",
        WasteCategory::Paper => "Place in paper recycling bin (ensure it's clean and dry)",
        WasteCategory::Organic => "Compost bin, organic waste collection, or backyard composting",
        WasteCategory::EWaste => "Take to certified e-waste recycling center or electronics retailer",
        WasteCategory::Biomedical => "Use medical waste disposal service or return to healthcare facility",
        WasteCategory::Unknown => {
            "Dispose of with general waste unless your local guidelines say otherwise"
        }
    }
}

pub fn environmental_impact(category: WasteCategory) -> &'static str {
    match category {
        WasteCategory::Plastic => "Recycling plastic reduces oil consumption and prevents ocean pollution. One recycled plastic bottle can save enough energy to power a light bulb for 3 hours.",
        WasteCategory::Glass => "Glass can be recycled indefinitely without losing quality. Recycling glass reduces energy consumption by 30% compared to making new glass.",
        WasteCategory::Metal => "Recycling aluminum cans uses 95% less energy than producing new ones. Steel recycling saves 74% of energy needed for new steel production.",
        WasteCategory::Paper => "Recycling paper saves trees, water, and energy. One ton of recycled paper saves 17 trees and 7,000 gallons of water.",
        WasteCategory::Organic => "Composting organic waste reduces methane emissions from landfills and creates nutrient-rich soil amendment for plants.",
        WasteCategory::EWaste => "Proper e-waste recycling recovers valuable metals and prevents toxic materials from contaminating soil and water.",
        WasteCategory::Biomedical => "Proper disposal prevents disease transmission and environmental contamination from pharmaceutical and biological materials.",
        WasteCategory::Unknown => "Sorting waste correctly keeps recyclable material out of landfill. Unidentified items are safest in general waste.",
    }
}

/// Joins a parsed model answer with the catalog entry for its category.
pub fn enrich(raw: &RawClassification) -> ClassificationResponseDto {
    let category = WasteCategory::from_label(&raw.category);
    if !category.is_known() {
        tracing::warn!(label = %raw.category, "model returned a category outside the catalog");
    }

    ClassificationResponseDto {
        category,
        confidence: raw.confidence_percent(),
        explanation: raw.explanation.clone(),
        recycling_tips: recycling_tips(category).iter().map(|t| t.to_string()).collect(),
        disposal_method: disposal_method(category).to_string(),
        environmental_impact: environmental_impact(category).to_string(),
    }
}
