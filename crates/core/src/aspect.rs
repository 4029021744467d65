//! Aspect-ratio snapping for the generative backend.
//!
//! The generation provider accepts a fixed set of named ratios. The room
//! image's ratio is snapped to the nearest one within the tolerance
//! windows below; anything outside every window falls back to "auto".
//! The windows are open intervals and intentionally do not tile the
//! whole axis.

/// Ratio value the provider treats as "pick for me".
pub const ASPECT_AUTO: &str = "auto";

/// Snap an image's width/height ratio to a provider-supported label.
pub fn snap_aspect_ratio(width: u32, height: u32) -> &'static str {
    if height == 0 {
        return ASPECT_AUTO;
    }
    let ratio = f64::from(width) / f64::from(height);

    if 0.95 < ratio && ratio < 1.05 {
        "1:1"
    } else if 1.3 < ratio && ratio < 1.4 {
        "4:3"
    } else if 1.5 < ratio && ratio < 1.6 {
        "3:2"
    } else if 1.7 < ratio && ratio < 1.9 {
        "16:9"
    } else if 2.2 < ratio && ratio < 2.4 {
        "21:9"
    } else if 0.6 < ratio && ratio < 0.7 {
        "2:3"
    } else if 0.7 < ratio && ratio < 0.8 {
        "3:4"
    } else if 0.5 < ratio && ratio < 0.6 {
        "9:16"
    } else {
        ASPECT_AUTO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_ratios_snap() {
        assert_eq!(snap_aspect_ratio(1080, 1080), "1:1");
        assert_eq!(snap_aspect_ratio(1600, 1200), "4:3");
        assert_eq!(snap_aspect_ratio(1500, 1000), "3:2");
        assert_eq!(snap_aspect_ratio(1920, 1080), "16:9");
        assert_eq!(snap_aspect_ratio(2560, 1097), "21:9");
        assert_eq!(snap_aspect_ratio(1000, 1500), "2:3");
        assert_eq!(snap_aspect_ratio(1125, 1500), "3:4");
        assert_eq!(snap_aspect_ratio(1080, 1920), "9:16");
    }

    #[test]
    fn oddball_ratios_fall_back_to_auto() {
        // 1.2 sits in the gap between the 1:1 and 4:3 windows.
        assert_eq!(snap_aspect_ratio(1200, 1000), ASPECT_AUTO);
        assert_eq!(snap_aspect_ratio(3000, 1000), ASPECT_AUTO);
        assert_eq!(snap_aspect_ratio(100, 1000), ASPECT_AUTO);
    }

    #[test]
    fn degenerate_height_is_auto() {
        assert_eq!(snap_aspect_ratio(100, 0), ASPECT_AUTO);
    }
}
