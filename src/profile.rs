//! User profile and body-mass-index derivation
//!
//! BMI is never stored on the profile. It is recomputed from the current
//! weight and height every time it is needed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::StorageError;
use crate::storage::{self, keys, KeyValueStore};

/// Colour accent chosen for the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTheme {
    #[default]
    Blue,
    Green,
    Purple,
    Orange,
}

/// Identity and body metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,

    /// Height in inches
    pub height: f64,

    /// Weight in lbs
    pub weight: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Reference to a locally stored photo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,

    #[serde(default)]
    pub theme: ColorTheme,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "Alex".to_string(),
            height: 70.0,
            weight: 165.0,
            date_of_birth: None,
            address: None,
            email: None,
            profile_photo: None,
            theme: ColorTheme::Blue,
        }
    }
}

impl UserProfile {
    pub fn bmi(&self) -> f64 {
        calculate_bmi(self.weight, self.height)
    }

    pub fn bmi_category(&self) -> BmiCategory {
        BmiCategory::from_bmi(self.bmi())
    }

    /// Merge every set field of a patch into this profile
    pub fn merge(&mut self, patch: ProfilePatch) {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.height {
            self.height = v;
        }
        if let Some(v) = patch.weight {
            self.weight = v;
        }
        if let Some(v) = patch.date_of_birth {
            self.date_of_birth = Some(v);
        }
        if let Some(v) = patch.address {
            self.address = Some(v);
        }
        if let Some(v) = patch.email {
            self.email = Some(v);
        }
        if let Some(v) = patch.profile_photo {
            self.profile_photo = Some(v);
        }
        if let Some(v) = patch.theme {
            self.theme = v;
        }
    }
}

/// Partial profile update; also the shape of a partially persisted profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub profile_photo: Option<String>,
    pub theme: Option<ColorTheme>,
}

/// Weight/BMI pair copied into the current day from a persisted profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileSeed {
    pub weight: f64,
    pub bmi: f64,
}

impl ProfileSeed {
    /// Only profiles with positive height and weight seed the day
    pub fn from_profile(profile: &UserProfile) -> Option<Self> {
        if profile.weight > 0.0 && profile.height > 0.0 {
            Some(Self {
                weight: profile.weight,
                bmi: profile.bmi(),
            })
        } else {
            None
        }
    }
}

/// Body mass index using the imperial formula `(lbs × 703) / in²`.
///
/// Non-positive height or weight yields 0 rather than an error.
pub fn calculate_bmi(weight_lbs: f64, height_in: f64) -> f64 {
    if height_in <= 0.0 || weight_lbs <= 0.0 {
        return 0.0;
    }
    (weight_lbs * 703.0) / (height_in * height_in)
}

/// Four-bucket BMI classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BmiCategory::Underweight => write!(f, "Underweight"),
            BmiCategory::Normal => write!(f, "Normal"),
            BmiCategory::Overweight => write!(f, "Overweight"),
            BmiCategory::Obese => write!(f, "Obese"),
        }
    }
}

/// Profile state plus whether it came from storage
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    profile: UserProfile,
    persisted: bool,
}

impl ProfileStore {
    /// Load the profile, merging any persisted fields over the defaults
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, StorageError> {
        match storage::load_json::<ProfilePatch>(store, keys::PROFILE)? {
            Some(patch) => {
                let mut profile = UserProfile::default();
                profile.merge(patch);
                Ok(Self {
                    profile,
                    persisted: true,
                })
            }
            None => Ok(Self::default()),
        }
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// True once a profile has been loaded from or written to storage
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Seed for the current day, only from a persisted profile
    pub fn seed(&self) -> Option<ProfileSeed> {
        if self.persisted {
            ProfileSeed::from_profile(&self.profile)
        } else {
            None
        }
    }

    pub fn bmi(&self) -> f64 {
        self.profile.bmi()
    }

    pub fn bmi_category(&self) -> BmiCategory {
        self.profile.bmi_category()
    }

    /// Merge a partial update and persist the full record
    pub fn update_profile(&mut self, patch: ProfilePatch, store: &mut dyn KeyValueStore) {
        self.profile.merge(patch);
        self.persist(store);
    }

    /// Replace the profile wholesale and persist it
    pub fn save_profile(&mut self, profile: UserProfile, store: &mut dyn KeyValueStore) {
        self.profile = profile;
        self.persist(store);
    }

    fn persist(&mut self, store: &mut dyn KeyValueStore) {
        self.persisted = true;
        storage::persist_best_effort(store, keys::PROFILE, &self.profile);
    }
}
