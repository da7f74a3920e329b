use eframe::egui;

/// Visual theme for the spectrum view: a background fill plus an 11-entry
/// palette keyed by intensity bucket. Pure cosmetics, no effect on analysis.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Theme {
    Default,
    Sunset,
    Synthwave,
    Trippy,
}

pub const ALL: [Theme; 4] = [Theme::Default, Theme::Sunset, Theme::Synthwave, Theme::Trippy];

/// Buckets a normalized level into the 11-entry palette index.
pub fn intensity_bucket(level: f32) -> usize {
    ((level.clamp(0.0, 1.0) * 10.0) as usize).min(10)
}

const WHITE: [egui::Color32; 11] = [egui::Color32::WHITE; 11];

const SUNSET: [egui::Color32; 11] = [
    egui::Color32::from_rgb(253, 207, 206),
    egui::Color32::from_rgb(252, 183, 182),
    egui::Color32::from_rgb(251, 159, 157),
    egui::Color32::from_rgb(250, 135, 133),
    egui::Color32::from_rgb(249, 110, 108),
    egui::Color32::from_rgb(248, 86, 84),
    egui::Color32::from_rgb(247, 62, 59),
    egui::Color32::from_rgb(246, 38, 35),
    egui::Color32::from_rgb(245, 14, 10),
    egui::Color32::from_rgb(220, 13, 9),
    egui::Color32::from_rgb(196, 11, 8),
];

const SYNTHWAVE: [egui::Color32; 11] = [
    egui::Color32::from_rgb(153, 230, 255),
    egui::Color32::from_rgb(128, 223, 255),
    egui::Color32::from_rgb(102, 217, 255),
    egui::Color32::from_rgb(77, 210, 255),
    egui::Color32::from_rgb(51, 204, 255),
    egui::Color32::from_rgb(26, 198, 255),
    egui::Color32::from_rgb(0, 191, 255),
    egui::Color32::from_rgb(0, 172, 230),
    egui::Color32::from_rgb(0, 153, 204),
    egui::Color32::from_rgb(0, 134, 179),
    egui::Color32::from_rgb(0, 115, 153),
];

const TRIPPY: [egui::Color32; 11] = [
    egui::Color32::from_rgb(255, 204, 255),
    egui::Color32::from_rgb(179, 218, 255),
    egui::Color32::from_rgb(153, 221, 255),
    egui::Color32::from_rgb(153, 255, 255),
    egui::Color32::from_rgb(153, 255, 204),
    egui::Color32::from_rgb(204, 255, 153),
    egui::Color32::from_rgb(255, 255, 153),
    egui::Color32::from_rgb(255, 191, 128),
    egui::Color32::from_rgb(255, 153, 153),
    egui::Color32::from_rgb(255, 102, 153),
    egui::Color32::from_rgb(255, 102, 102),
];

impl Theme {
    pub fn label(self) -> &'static str {
        match self {
            Theme::Default => "Default",
            Theme::Sunset => "Sunset",
            Theme::Synthwave => "Synthwave",
            Theme::Trippy => "Trippy",
        }
    }

    pub fn background(self) -> egui::Color32 {
        match self {
            Theme::Default => egui::Color32::BLACK,
            Theme::Sunset => egui::Color32::from_rgb(82, 20, 61),
            Theme::Synthwave => egui::Color32::BLACK,
            Theme::Trippy => egui::Color32::from_rgb(253, 213, 152),
        }
    }

    pub fn palette(self) -> &'static [egui::Color32; 11] {
        match self {
            Theme::Default => &WHITE,
            Theme::Sunset => &SUNSET,
            Theme::Synthwave => &SYNTHWAVE,
            Theme::Trippy => &TRIPPY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_cover_the_unit_range() {
        assert_eq!(intensity_bucket(0.0), 0);
        assert_eq!(intensity_bucket(0.55), 5);
        assert_eq!(intensity_bucket(1.0), 10);
    }

    #[test]
    fn out_of_range_levels_clamp_into_the_palette() {
        assert_eq!(intensity_bucket(-0.5), 0);
        assert_eq!(intensity_bucket(7.0), 10);
        assert!(intensity_bucket(f32::NAN) <= 10);
    }
}
