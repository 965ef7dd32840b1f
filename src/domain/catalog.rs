//! Static reference tables: drone models, camera upgrades, Argentine taxes.
//!
//! The catalog is built once on first access and shared read-only afterwards.

use std::{collections::HashMap, fmt, sync::OnceLock};

use serde::{Deserialize, Serialize};

/// Model substituted whenever a spec names a model the catalog does not know.
pub const DEFAULT_MODEL: &str = "DJI Phantom Standard";

/// Camera upgrades whose sensors trigger extra import scrutiny.
pub const RESTRICTED_SENSORS: [&str; 2] = ["Thermal + RGB", "Multispectral"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Entry,
    Consumer,
    Prosumer,
    Professional,
    Enterprise,
    Agricultural,
    Cinema,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Entry,
        Category::Consumer,
        Category::Prosumer,
        Category::Professional,
        Category::Enterprise,
        Category::Agricultural,
        Category::Cinema,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Entry => "Entry",
            Category::Consumer => "Consumer",
            Category::Prosumer => "Prosumer",
            Category::Professional => "Professional",
            Category::Enterprise => "Enterprise",
            Category::Agricultural => "Agricultural",
            Category::Cinema => "Cinema",
        }
    }

    /// Handling and regulatory factors applied to every import of this category.
    pub fn profile(&self) -> CategoryProfile {
        match self {
            Category::Agricultural => CategoryProfile {
                freight_multiplier: 2.5,
                challenge_multiplier: 1.3,
                base_complexity: 1.5,
                challenge_fee: 200.0,
            },
            Category::Enterprise => CategoryProfile {
                freight_multiplier: 1.8,
                challenge_multiplier: 1.2,
                base_complexity: 1.3,
                challenge_fee: 200.0,
            },
            Category::Cinema => CategoryProfile {
                freight_multiplier: 2.0,
                challenge_multiplier: 1.15,
                base_complexity: 1.0,
                challenge_fee: 0.0,
            },
            Category::Entry | Category::Consumer | Category::Prosumer | Category::Professional => {
                CategoryProfile::STANDARD
            }
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CategoryProfile {
    pub freight_multiplier: f64,
    pub challenge_multiplier: f64,
    /// Scales fiscal deposit, clearance and IVA-on-expenses logistics lines.
    pub base_complexity: f64,
    pub challenge_fee: f64,
}

impl CategoryProfile {
    pub const STANDARD: CategoryProfile = CategoryProfile {
        freight_multiplier: 1.0,
        challenge_multiplier: 1.0,
        base_complexity: 1.0,
        challenge_fee: 0.0,
    };
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub name: String,
    pub new_price: f64,
    /// Observed used-market price interval, low first.
    pub used_range: (f64, f64),
    pub camera: String,
    /// Flight time in minutes.
    pub battery_life: u32,
    pub category: Category,
    pub use_case: String,
    pub depreciation: f64,
    pub argentine_price_ars: f64,
    pub challenges: Vec<String>,
    /// Authored estimate; never reconciled with the computed ratio.
    pub import_advantage: f64,
}

impl ModelRecord {
    pub fn used_midpoint(&self) -> f64 {
        (self.used_range.0 + self.used_range.1) / 2.0
    }

    pub fn challenge_count(&self) -> usize {
        self.challenges.len()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraUpgrade {
    pub name: String,
    pub cost: f64,
    pub quality: String,
    pub resolution: String,
    pub restricted_sensor: bool,
}

/// Argentine import tax rates, applied to the CIF value. `sim_fee` is flat.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaxTable {
    pub import_duty: f64,
    pub statistics_fee: f64,
    pub iva: f64,
    pub additional_iva: f64,
    pub gross_income: f64,
    pub advance_profit: f64,
    pub sim_fee: f64,
}

pub const ARGENTINE_TAXES: TaxTable = TaxTable {
    import_duty: 0.0,
    statistics_fee: 0.0,
    iva: 0.105,
    additional_iva: 0.10,
    gross_income: 0.03,
    advance_profit: 0.06,
    sim_fee: 10.0,
};

/// Relative perturbations used by the sensitivity analyses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SensitivityRanges {
    pub exw_variation: f64,
    pub freight_variation: f64,
    pub exchange_variation: f64,
    pub battery_variation: f64,
}

pub const SENSITIVITY_RANGES: SensitivityRanges = SensitivityRanges {
    exw_variation: 0.20,
    freight_variation: 0.25,
    exchange_variation: 0.15,
    battery_variation: 0.30,
};

pub struct Catalog {
    models: Vec<ModelRecord>,
    model_index: HashMap<String, usize>,
    cameras: Vec<CameraUpgrade>,
    camera_index: HashMap<String, usize>,
}

impl Catalog {
    fn new(models: Vec<ModelRecord>, cameras: Vec<CameraUpgrade>) -> Self {
        let model_index = models
            .iter()
            .enumerate()
            .map(|(idx, model)| (model.name.clone(), idx))
            .collect();
        let camera_index = cameras
            .iter()
            .enumerate()
            .map(|(idx, camera)| (camera.name.clone(), idx))
            .collect();
        Self {
            models,
            model_index,
            cameras,
            camera_index,
        }
    }

    pub fn model(&self, name: &str) -> Option<&ModelRecord> {
        self.model_index.get(name).map(|&idx| &self.models[idx])
    }

    /// Looks up a model, substituting the default record for unknown names.
    pub fn model_or_default(&self, name: &str) -> &ModelRecord {
        self.model(name)
            .or_else(|| self.model(DEFAULT_MODEL))
            .unwrap_or(&self.models[0])
    }

    /// Models in declaration order.
    pub fn models(&self) -> &[ModelRecord] {
        &self.models
    }

    pub fn models_in(&self, category: Category) -> impl Iterator<Item = &ModelRecord> {
        self.models
            .iter()
            .filter(move |model| model.category == category)
    }

    pub fn camera(&self, name: &str) -> Option<&CameraUpgrade> {
        self.camera_index.get(name).map(|&idx| &self.cameras[idx])
    }

    pub fn camera_cost(&self, name: &str) -> f64 {
        self.camera(name).map(|camera| camera.cost).unwrap_or(0.0)
    }

    pub fn cameras(&self) -> &[CameraUpgrade] {
        &self.cameras
    }
}

/// Shared, immutable catalog.
pub fn catalog() -> &'static Catalog {
    static CATALOG: OnceLock<Catalog> = OnceLock::new();
    CATALOG.get_or_init(|| Catalog::new(build_models(), build_cameras()))
}

#[allow(clippy::too_many_arguments)]
fn model(
    name: &str,
    new_price: f64,
    used_range: (f64, f64),
    camera: &str,
    battery_life: u32,
    category: Category,
    use_case: &str,
    depreciation: f64,
    argentine_price_ars: f64,
    challenges: &[&str],
    import_advantage: f64,
) -> ModelRecord {
    ModelRecord {
        name: name.to_string(),
        new_price,
        used_range,
        camera: camera.to_string(),
        battery_life,
        category,
        use_case: use_case.to_string(),
        depreciation,
        argentine_price_ars,
        challenges: challenges.iter().map(|c| c.to_string()).collect(),
        import_advantage,
    }
}

fn build_models() -> Vec<ModelRecord> {
    use Category::*;

    vec![
        // Consumer DJI
        model("DJI Neo", 159.0, (80.0, 120.0), "Basic 4K", 18, Entry, "Beginner/Indoor", 0.25,
            250_000.0, &["Limited battery life", "Basic features"], 4.2),
        model("DJI Mini 2 SE", 349.0, (180.0, 280.0), "2.7K", 31, Entry, "Casual/Travel", 0.20,
            650_000.0, &["No obstacle avoidance"], 2.8),
        model("DJI Mini 4 Pro", 759.0, (450.0, 650.0), "4K HDR", 34, Consumer, "Content Creation", 0.15,
            1_400_000.0, &["Popular model - good availability"], 2.5),
        model("DJI Phantom Standard", 537.0, (250.0, 400.0), "HD", 28, Consumer, "General Purpose", 0.30,
            800_000.0, &["Older model", "Large size"], 2.4),
        model("DJI Air 3S", 1299.0, (800.0, 1100.0), "Dual 4K", 45, Prosumer, "Professional Photo/Video", 0.18,
            2_200_000.0, &["High demand", "Complex dual camera"], 2.0),
        model("DJI Mavic 3 Pro", 2399.0, (1600.0, 2000.0), "5.1K Hasselblad Triple", 43, Professional,
            "Cinema/Commercial", 0.20, 4_500_000.0,
            &["Professional market limited", "High-end features"], 2.3),
        model("DJI Mavic 4 Pro (2025)", 2250.0, (1800.0, 2100.0), "6K HDR Triple", 51, Professional,
            "Next-Gen Cinema", 0.10, 4_200_000.0,
            &["Latest model", "Limited used availability"], 2.0),
        // Enterprise DJI
        model("DJI Mavic 3M (Multispectral)", 5344.0, (4500.0, 5400.0), "Multispectral + RGB", 43,
            Enterprise, "Agriculture/Mapping", 0.08, 12_000_000.0,
            &["Agricultural import restrictions", "Specialized sensors", "Limited market"], 2.6),
        model("DJI Matrice 30T", 10748.0, (8500.0, 9000.0), "Thermal + 48MP Zoom", 41, Enterprise,
            "Inspection/Public Safety", 0.15, 22_000_000.0,
            &["Thermal camera import regulations", "Professional certification required"], 2.4),
        model("DJI Matrice 300 RTK", 14000.0, (6500.0, 11000.0), "Modular Payload", 55, Enterprise,
            "Professional Surveying", 0.35, 28_000_000.0,
            &["Large size freight", "Professional market limited", "High depreciation"], 3.2),
        model("DJI Matrice 350 RTK", 12050.0, (8000.0, 10000.0), "Enhanced Payload System", 55,
            Enterprise, "Advanced Surveying", 0.20, 25_000_000.0,
            &["Latest enterprise model", "Complex import procedures"], 2.8),
        // Agricultural
        model("DJI Agras T30", 15000.0, (11000.0, 13000.0), "FPV + Task Camera", 22, Agricultural,
            "Crop Spraying", 0.25, 35_000_000.0,
            &["Agricultural equipment import restrictions", "SENASA approval required", "Special freight"],
            2.8),
        model("DJI Agras T40", 23259.0, (18000.0, 21000.0), "Dual FPV + Task", 25, Agricultural,
            "Large Scale Spraying", 0.15, 50_000_000.0,
            &["Professional agricultural license", "Large tank capacity import", "Specialized training"],
            2.4),
        model("DJI Agras T50", 22670.0, (19000.0, 21500.0), "Advanced FPV System", 27, Agricultural,
            "Professional Agriculture", 0.10, 48_000_000.0,
            &["Latest agricultural tech", "Limited used market", "High-end features"], 2.3),
        model("Hylio AG-110", 18040.0, (15000.0, 17000.0), "Navigation Camera", 25, Agricultural,
            "Precision Agriculture", 0.12, 42_000_000.0,
            &["US-made premium", "Limited brand recognition in ARG"], 2.6),
        model("Hylio AG-272", 69500.0, (58000.0, 65000.0), "Professional Navigation", 30, Agricultural,
            "Industrial Agriculture", 0.10, 150_000_000.0,
            &["Industrial-scale equipment", "Complex import procedures", "High-value declaration"], 2.4),
        // Autel (NDAA compliant)
        model("Autel EVO Nano+", 719.0, (400.0, 600.0), "4K HDR", 28, Consumer, "DJI Alternative", 0.25,
            1_200_000.0, &["Limited brand recognition", "Service network"], 2.2),
        model("Autel EVO Lite+", 1199.0, (750.0, 1000.0), "6K Moonlight", 40, Prosumer,
            "NDAA Compliant Pro", 0.22, 2_000_000.0,
            &["NDAA compliance premium", "Limited service"], 2.2),
        model("Autel EVO II Dual 640T V3", 5399.0, (4000.0, 4800.0), "Thermal + 8K", 40, Enterprise,
            "Thermal Inspection", 0.18, 11_000_000.0,
            &["Thermal import restrictions", "Professional market"], 2.4),
        // Specialized platforms
        model("senseFly eBee X", 30000.0, (7999.0, 12000.0), "Mapping Camera", 90, Enterprise,
            "Fixed-wing Mapping", 0.65, 25_000_000.0,
            &["Fixed-wing different regulations", "Professional surveying only"], 5.2),
        model("Freefly Alta 8 Pro", 25000.0, (15450.0, 18000.0), "Cinema Payload", 15, Cinema,
            "Professional Film", 0.30, 45_000_000.0,
            &["Cinema market limited", "Professional operators only"], 2.8),
        model("Skydio X2", 11000.0, (8000.0, 9500.0), "4K AI Navigation", 23, Enterprise,
            "Autonomous Inspection", 0.20, 20_000_000.0,
            &["US government contractor origins", "AI technology complexity"], 2.3),
    ]
}

fn build_cameras() -> Vec<CameraUpgrade> {
    [
        ("Standard HD", 0.0, "Basic", "1080p"),
        ("2.7K Standard", 120.0, "Good", "2.7K"),
        ("4K Standard", 280.0, "Very Good", "4K/30fps"),
        ("4K HDR Pro", 450.0, "Excellent", "4K/60fps HDR"),
        ("6K Professional", 800.0, "Cinema", "6K/30fps"),
        ("4K AI Tracking", 600.0, "AI-Enhanced", "4K with AI"),
        ("Thermal + RGB", 2000.0, "Industrial", "Thermal + RGB"),
        ("Multispectral", 3000.0, "Agricultural", "Multi-band Imaging"),
    ]
    .into_iter()
    .map(|(name, cost, quality, resolution)| CameraUpgrade {
        name: name.to_string(),
        cost,
        quality: quality.to_string(),
        resolution: resolution.to_string(),
        restricted_sensor: RESTRICTED_SENSORS.contains(&name),
    })
    .collect()
}
