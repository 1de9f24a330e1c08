//! The fixed allow-list of operating areas and their card artwork.
//!
//! Every aggregation keys on these region names; rows for any other area
//! are excluded upstream. Artwork lives on a CDN and an area without a
//! dedicated image falls back to the shared default.

/// Operating regions the dashboard reports on.
pub const OPERATING_AREAS: [&str; 17] = [
    "Salem",
    "North Portland",
    "Des Moines",
    "Minneapolis",
    "Portland",
    "Pasco",
    "Medford",
    "Bozeman",
    "Cincinnati",
    "Helena",
    "Cedar Rapids",
    "Missoula",
    "Puget Sound",
    "Spokane",
    "Bend",
    "Billings",
    "Utah",
];

/// Fallback card image for areas (and reps) without dedicated artwork.
pub const DEFAULT_PROFILE_PICTURE: &str =
    "https://res.cloudinary.com/dwuzrptk6/image/upload/v1730865202/Group_1127_zhbvez.png";

/// Artwork for the aggregate "All Areas" card.
pub const ALL_AREAS_PICTURE: &str =
    "https://res.cloudinary.com/dwuzrptk6/image/upload/v1732061718/Group_1147_ad1zmf.png";

/// Whether an area name is on the allow-list.
pub fn is_operating_area(area: &str) -> bool {
    OPERATING_AREAS.contains(&area)
}

/// Card artwork for an area, falling back to the default image.
pub fn profile_picture_url(area: &str) -> &'static str {
    match area {
        "Salem" => "https://res.cloudinary.com/dwuzrptk6/image/upload/v1730863720/salem_eckoe1.png",
        "Des Moines" => {
            "https://res.cloudinary.com/dwuzrptk6/image/upload/v1730863717/des_moines_mcwvbz.png"
        }
        "Minneapolis" => {
            "https://res.cloudinary.com/dwuzrptk6/image/upload/v1730863713/minneapolis_jlnpqw.png"
        }
        "Portland" => {
            "https://res.cloudinary.com/dwuzrptk6/image/upload/v1730863714/portland_iwid9m.png"
        }
        "Pasco" => "https://res.cloudinary.com/dwuzrptk6/image/upload/v1730863718/pasco_fxdzsg.png",
        "Medford" => {
            "https://res.cloudinary.com/dwuzrptk6/image/upload/v1730863720/medford_ks5ol1.png"
        }
        "Bozeman" => {
            "https://res.cloudinary.com/dwuzrptk6/image/upload/v1730863714/bozeman_z1dcyw.png"
        }
        "Cincinnati" => {
            "https://res.cloudinary.com/dwuzrptk6/image/upload/v1733779348/Cincinnati_2-Photoroom_rxg5dz.png"
        }
        "Helena" => "https://res.cloudinary.com/dwuzrptk6/image/upload/v1730863713/helena_b0lpfy.png",
        "Cedar Rapids" => {
            "https://res.cloudinary.com/dwuzrptk6/image/upload/v1730865480/Group_1128_bckfag.png"
        }
        "Missoula" => {
            "https://res.cloudinary.com/dwuzrptk6/image/upload/v1730863715/missoulda_lmfros.png"
        }
        "Puget Sound" => {
            "https://res.cloudinary.com/dwuzrptk6/image/upload/v1733779404/PugetSound-Photoroom_wmj5k7.png"
        }
        "Spokane" => {
            "https://res.cloudinary.com/dwuzrptk6/image/upload/v1730863715/spokane_i8tixp.png"
        }
        "Bend" => "https://res.cloudinary.com/dwuzrptk6/image/upload/v1730863714/bend_dvre85.png",
        "Billings" => {
            "https://res.cloudinary.com/dwuzrptk6/image/upload/v1730863716/billings_hezzk6.png"
        }
        "Utah" => "https://res.cloudinary.com/dwuzrptk6/image/upload/v1733790161/Asset_2_zfodre.png",
        _ => DEFAULT_PROFILE_PICTURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_membership() {
        assert!(is_operating_area("Bend"));
        assert!(is_operating_area("North Portland"));
        assert!(!is_operating_area("Boise"));
        assert!(!is_operating_area(""));
    }

    #[test]
    fn known_area_has_dedicated_artwork() {
        assert!(profile_picture_url("Bend").contains("bend"));
        assert_ne!(profile_picture_url("Salem"), DEFAULT_PROFILE_PICTURE);
    }

    #[test]
    fn unknown_area_falls_back_to_default() {
        assert_eq!(profile_picture_url("Boise"), DEFAULT_PROFILE_PICTURE);
        // North Portland has no dedicated image and uses the shared default.
        assert_eq!(profile_picture_url("North Portland"), DEFAULT_PROFILE_PICTURE);
    }
}
