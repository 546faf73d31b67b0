use crate::model::ComponentType;

#[derive(serde::Deserialize, serde::Serialize)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    Bengali,
    English,
}

impl Language {
    pub fn toggled(self) -> Self {
        match self {
            Language::Bengali => Language::English,
            Language::English => Language::Bengali,
        }
    }

    /// Picks the string matching this language.
    pub fn pick<'a>(self, bn: &'a str, en: &'a str) -> &'a str {
        match self {
            Language::Bengali => bn,
            Language::English => en,
        }
    }
}

/// One button in the component palette.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaletteEntry {
    pub ty: ComponentType,
    pub label_en: &'static str,
    pub label_bn: &'static str,
    pub icon: &'static str,
}

impl PaletteEntry {
    pub fn label(&self, lang: Language) -> &'static str {
        lang.pick(self.label_bn, self.label_en)
    }
}

pub const PALETTE: [PaletteEntry; 8] = [
    PaletteEntry {
        ty: ComponentType::Battery,
        label_en: "Battery",
        label_bn: "ব্যাটারি",
        icon: "🔋",
    },
    PaletteEntry {
        ty: ComponentType::Resistor,
        label_en: "Resistor",
        label_bn: "রোধক",
        icon: "Ω",
    },
    PaletteEntry {
        ty: ComponentType::Wire,
        label_en: "Wire",
        label_bn: "তার",
        icon: "─",
    },
    PaletteEntry {
        ty: ComponentType::Switch,
        label_en: "Switch",
        label_bn: "সুইচ",
        icon: "⏻",
    },
    PaletteEntry {
        ty: ComponentType::Bulb,
        label_en: "Bulb",
        label_bn: "বাল্ব",
        icon: "💡",
    },
    PaletteEntry {
        ty: ComponentType::Led,
        label_en: "LED",
        label_bn: "এলইডি",
        icon: "▶",
    },
    PaletteEntry {
        ty: ComponentType::Capacitor,
        label_en: "Capacitor",
        label_bn: "ধারক",
        icon: "⊣⊢",
    },
    PaletteEntry {
        ty: ComponentType::Inductor,
        label_en: "Inductor",
        label_bn: "আবেশক",
        icon: "∿",
    },
];

pub fn entry(ty: ComponentType) -> &'static PaletteEntry {
    PALETTE
        .iter()
        .find(|entry| entry.ty == ty)
        .unwrap_or(&PALETTE[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_type_has_an_entry() {
        for ty in ComponentType::ALL {
            assert_eq!(entry(ty).ty, ty);
        }
    }

    #[test]
    fn labels_follow_language() {
        let resistor = entry(ComponentType::Resistor);
        assert_eq!(resistor.label(Language::English), "Resistor");
        assert_eq!(resistor.label(Language::Bengali), "রোধক");
        assert_eq!(Language::Bengali.toggled(), Language::English);
    }
}
