use eframe::egui::Color32;

/// Named colors accepted in settings files.
const NAMED_COLORS: &[(&str, Color32)] = &[
    ("black", Color32::BLACK),
    ("white", Color32::WHITE),
    ("red", Color32::from_rgb(255, 0, 0)),
    ("green", Color32::from_rgb(0, 128, 0)),
    ("blue", Color32::from_rgb(0, 0, 255)),
    ("yellow", Color32::from_rgb(255, 255, 0)),
    ("orange", Color32::from_rgb(255, 165, 0)),
    ("purple", Color32::from_rgb(128, 0, 128)),
    ("gray", Color32::from_rgb(128, 128, 128)),
];

/// Parse `#rrggbb`, `#rrggbbaa` or a color name into a color.
pub fn parse_color(text: &str) -> Option<Color32> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix('#') {
        return parse_hex(hex);
    }
    NAMED_COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(text))
        .map(|(_, color)| *color)
}

fn parse_hex(hex: &str) -> Option<Color32> {
    if !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        6 => Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?)),
        8 => Some(Color32::from_rgba_unmultiplied(
            channel(0)?,
            channel(2)?,
            channel(4)?,
            channel(6)?,
        )),
        _ => None,
    }
}

/// Number of user color slots kept by [`CustomPalette`].
pub const CUSTOM_COLOR_SLOTS: usize = 16;

/// User-collected colors kept for the whole session. Slots start white.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomPalette {
    slots: [Color32; CUSTOM_COLOR_SLOTS],
    next: usize,
    filled: usize,
}

impl Default for CustomPalette {
    fn default() -> Self {
        Self {
            slots: [Color32::WHITE; CUSTOM_COLOR_SLOTS],
            next: 0,
            filled: 0,
        }
    }
}

impl CustomPalette {
    pub fn slots(&self) -> &[Color32] {
        &self.slots
    }

    pub fn get(&self, idx: usize) -> Option<Color32> {
        self.slots.get(idx).copied()
    }

    /// Overwrite one slot. Returns `false` for an index past the last slot.
    pub fn set(&mut self, idx: usize, color: Color32) -> bool {
        match self.slots.get_mut(idx) {
            Some(slot) => {
                *slot = color;
                true
            }
            None => false,
        }
    }

    /// Store `color` in the next slot, wrapping around after the last one.
    /// A color that is already remembered keeps its slot. Returns the slot.
    pub fn remember(&mut self, color: Color32) -> usize {
        if let Some(idx) = self.slots[..self.filled].iter().position(|c| *c == color) {
            return idx;
        }
        let idx = self.next;
        self.slots[idx] = color;
        self.next = (idx + 1) % CUSTOM_COLOR_SLOTS;
        self.filled = (self.filled + 1).min(CUSTOM_COLOR_SLOTS);
        idx
    }
}

/// Format a color as `#rrggbb`, adding the alpha byte only when it is not opaque.
pub fn color_to_hex(color: Color32) -> String {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    if a == 255 {
        format!("#{r:02x}{g:02x}{b:02x}")
    } else {
        format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}
