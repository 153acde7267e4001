// src/glyphs.rs
//! Paints the LCD face: a live 12-hour clock in the style of a segment
//! display, or a UV-debug grid for checking the screen mesh's mapping.
//!
//! Pure with respect to everything except the supplied wall-clock `Moment`;
//! draws into any [`Surface2d`] and never fails. Layout constants are in
//! 512×512 reference pixels; the baseline row scales with surface height.

use chrono::{Datelike, Local, Timelike, Weekday};

use crate::canvas::{Baseline, Color, Surface2d, TextAlign, TextStyle};
use crate::mode::DisplayMode;

// LCD palette: warm greenish backplate, near-black segments.
const LCD_BACKGROUND: Color = Color::from_hex(0xd7d4b4);
const LCD_TEXT: Color = Color::from_hex(0x16160f);

const MARGIN: f32 = 60.0;
const TOP_ROW_Y: f32 = 88.0;

const AMPM_PX: f32 = 30.0;
const WEEKDAY_PX: f32 = 52.0;
const DATE_PX: f32 = 46.0;
const TIME_PX: f32 = 110.0;
const SECONDS_PX: f32 = 64.0;

// Negative kerning tightens the 7-segment digits toward the colon.
const KERN_AFTER_HOURS: f32 = -12.0;
const KERN_AFTER_COLON: f32 = -6.0;
const SECONDS_GAP: f32 = 32.0;
const SECONDS_NUDGE: f32 = -30.0;

/// A sampled wall-clock instant, decomposed for layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moment {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub weekday: Weekday,
    pub day: u32,
}

impl Moment {
    pub fn now() -> Self {
        let now = Local::now();
        Self {
            hour: now.hour(),
            minute: now.minute(),
            second: now.second(),
            weekday: now.weekday(),
            day: now.day(),
        }
    }

    pub fn new(hour: u32, minute: u32, second: u32, weekday: Weekday, day: u32) -> Self {
        Self {
            hour,
            minute,
            second,
            weekday,
            day,
        }
    }

    /// 12-hour display hour; midnight and noon render as 12.
    #[inline]
    pub fn hour12(&self) -> u32 {
        match self.hour % 12 {
            0 => 12,
            h => h,
        }
    }

    /// Two-letter uppercase en-US weekday abbreviation (MO, TU, WE, ...).
    pub fn weekday_abbrev(&self) -> &'static str {
        match self.weekday {
            Weekday::Mon => "MO",
            Weekday::Tue => "TU",
            Weekday::Wed => "WE",
            Weekday::Thu => "TH",
            Weekday::Fri => "FR",
            Weekday::Sat => "SA",
            Weekday::Sun => "SU",
        }
    }
}

/// Paint one frame of the screen in the given mode.
pub fn paint(surface: &mut dyn Surface2d, mode: DisplayMode, moment: Moment) {
    match mode {
        DisplayMode::Time => paint_time(surface, moment),
        DisplayMode::Uv => paint_uv_grid(surface),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Time mode
// ─────────────────────────────────────────────────────────────────────────────

struct Segment<'a> {
    text: &'a str,
    spacing_after: f32,
}

/// Advance of a kerned segment run, excluding the trailing kern of the last
/// segment so centering is computed against visible glyphs only.
fn measure_segments(surface: &dyn Surface2d, segments: &[Segment], style: TextStyle) -> f32 {
    let mut total = 0.0;
    for (i, seg) in segments.iter().enumerate() {
        total += surface.measure_text(seg.text, style);
        if i + 1 < segments.len() {
            total += seg.spacing_after;
        }
    }
    total
}

fn draw_segments(
    surface: &mut dyn Surface2d,
    segments: &[Segment],
    start_x: f32,
    baseline: f32,
    style: TextStyle,
    color: Color,
) {
    let mut cursor = start_x;
    for (i, seg) in segments.iter().enumerate() {
        surface.fill_text(seg.text, cursor, baseline, style, color);
        cursor += surface.measure_text(seg.text, style);
        if i + 1 < segments.len() {
            cursor += seg.spacing_after;
        }
    }
}

fn paint_time(surface: &mut dyn Surface2d, moment: Moment) {
    let (w, h) = surface.size();
    let (w, h) = (w as f32, h as f32);

    surface.fill_rect(0.0, 0.0, w, h, LCD_BACKGROUND);

    let time_baseline = h * 0.56 - 30.0;

    // Only the PM half of the meridiem is ever shown; the A158W face has no
    // AM segment, and the asymmetry is kept on purpose.
    if moment.hour >= 12 {
        surface.fill_text(
            "PM",
            MARGIN - 14.0,
            TOP_ROW_Y + 24.0,
            TextStyle::label(AMPM_PX),
            LCD_TEXT,
        );
    }

    surface.fill_text(
        moment.weekday_abbrev(),
        w / 2.0 - 50.0,
        TOP_ROW_Y,
        TextStyle::display(WEEKDAY_PX).align(TextAlign::Center),
        LCD_TEXT,
    );

    let date_number = moment.day.to_string();
    surface.fill_text(
        &date_number,
        w - MARGIN,
        TOP_ROW_Y,
        TextStyle::display(DATE_PX).align(TextAlign::Right),
        LCD_TEXT,
    );

    let hours_text = moment.hour12().to_string();
    let minutes_text = format!("{:02}", moment.minute);
    let seconds_text = format!("{:02}", moment.second);

    let time_style = TextStyle::display(TIME_PX);
    let seconds_style = TextStyle::display(SECONDS_PX);

    let segments = [
        Segment {
            text: &hours_text,
            spacing_after: KERN_AFTER_HOURS,
        },
        Segment {
            text: ":",
            spacing_after: KERN_AFTER_COLON,
        },
        Segment {
            text: &minutes_text,
            spacing_after: 0.0,
        },
    ];

    let total_time_width = measure_segments(surface, &segments, time_style);
    let seconds_width = surface.measure_text(&seconds_text, seconds_style);

    // Center hour:minute plus the seconds block as one unit.
    let combined_width = total_time_width + SECONDS_GAP + seconds_width;
    let block_start_x = w / 2.0 - combined_width / 2.0;

    draw_segments(
        surface,
        &segments,
        block_start_x,
        time_baseline,
        time_style,
        LCD_TEXT,
    );

    surface.fill_text(
        &seconds_text,
        block_start_x + total_time_width + SECONDS_GAP + SECONDS_NUDGE,
        time_baseline,
        seconds_style,
        LCD_TEXT,
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// UV-debug mode
// ─────────────────────────────────────────────────────────────────────────────

const UV_COLS: u32 = 8;
const UV_ROWS: u32 = 8;

fn paint_uv_grid(surface: &mut dyn Surface2d) {
    let (w, h) = surface.size();
    let (w, h) = (w as f32, h as f32);
    let cell_w = w / UV_COLS as f32;
    let cell_h = h / UV_ROWS as f32;

    surface.fill_rect(0.0, 0.0, w, h, Color::from_hex(0x0a0a0a));

    let grid_stroke = Color::rgb(255, 255, 255).with_alpha(0.35);
    let label_style = TextStyle::label(32.0)
        .align(TextAlign::Center)
        .baseline(Baseline::Middle);

    for y in 0..UV_ROWS {
        for x in 0..UV_COLS {
            let hue = (x as f32 / UV_COLS as f32) * 360.0;
            let light = 40.0 + (y as f32 / UV_ROWS as f32) * 25.0;
            let cx = x as f32 * cell_w;
            let cy = y as f32 * cell_h;

            surface.fill_rect(cx, cy, cell_w, cell_h, Color::hsl(hue, 65.0, light));
            surface.stroke_rect(cx, cy, cell_w, cell_h, 2.0, grid_stroke);

            let u = x as f32 / (UV_COLS - 1) as f32;
            let v = y as f32 / (UV_ROWS - 1) as f32;
            let center_x = cx + cell_w / 2.0;
            let center_y = cy + cell_h / 2.0;
            surface.fill_text(
                &format!("U{u:.2}"),
                center_x,
                center_y - 14.0,
                label_style,
                Color::rgb(255, 255, 255),
            );
            surface.fill_text(
                &format!("V{v:.2}"),
                center_x,
                center_y + 18.0,
                label_style,
                Color::rgb(255, 255, 255),
            );
        }
    }

    // Midline crosshairs over the whole surface.
    let crosshair = Color::rgb(0, 0, 0).with_alpha(0.3);
    surface.fill_rect(0.0, h / 2.0 - 4.0, w, 8.0, crosshair);
    surface.fill_rect(w / 2.0 - 4.0, 0.0, 8.0, h, crosshair);
}
