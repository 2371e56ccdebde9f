use cavern_common::Metadata;

/// A display name and description shown when an object is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub name: &'static str,
    pub description: &'static str,
}

impl Entry {
    pub fn metadata(&self) -> Metadata {
        Metadata::new(self.name, self.description)
    }
}

pub const STALAGMITE: Entry = Entry {
    name: "Stalagmite 🪨",
    description: "Stalagmites form when mineral-rich water drips from cave ceilings and deposits \
        calcium carbonate onto the floor. Over centuries to millennia, these deposits accumulate \
        layer by layer, slowly growing upward. Each drip leaves behind a microscopic mineral ring, \
        so stalagmites act as natural climate records: their growth patterns can reveal ancient \
        rainfall, temperature, and atmospheric conditions. Stalagmites grow extremely slowly, \
        often less than a few millimeters per century. Touching them can disrupt mineral \
        deposition and permanently halt growth.",
};

pub const SPIKE: Entry = Entry {
    name: "Spiky Stalagmite",
    description: "Smaller mineral pokes around main stalagmite.",
};

pub const CRYSTAL_CLUSTER: Entry = Entry {
    name: "Crystal Cluster 💎",
    description: "Crystal clusters form when mineral-rich water seeps into cavities and slowly \
        evaporates, allowing crystals to grow together in radiating groups. Common minerals \
        include calcite and quartz. The stable cave environment lets these clusters develop sharp \
        forms over thousands of years, making them extremely fragile and irreplaceable.",
};

pub const STALACTITE: Entry = Entry {
    name: "Stalactite",
    description: "Mineral formation hanging from ceiling.",
};

pub const CEILING_CRYSTAL: Entry = Entry {
    name: "Crystal Cluster",
    description: "Shiny translucent crystals.",
};

pub const FUNGUS: Entry = Entry {
    name: "Cave Fungus",
    description: "Bioluminescent fungus growing on the ceiling.",
};

pub const BAT: Entry = Entry {
    name: "Cave Bat 🦇",
    description: "Bats navigate complete darkness using echolocation: they emit high-frequency \
        sound pulses and interpret the echoes that bounce back from cave walls, insects, and other \
        bats. This allows them to \"see\" their surroundings with sound, detecting objects thinner \
        than a human hair. In caves, echolocation is far more reliable than vision. The rapid \
        echoes also help bats avoid collisions in dense spaces while hunting insects mid-flight. \
        Their wings are highly flexible membranes, evolved for tight maneuvering rather than \
        speed. Cave bats play a crucial ecological role by controlling insect populations and \
        transporting nutrients into cave systems through guano.",
};

pub const OLM: Entry = Entry {
    name: "Olm 🦎 (Proteus anguinus)",
    description: "The olm is a troglobitic species, an animal that spends its entire life \
        underground in complete darkness. Over thousands of generations, natural selection favored \
        efficiency over sight, causing olms to lose functional eyes entirely. Instead of vision, \
        olms rely on heightened senses of smell, vibration, and electrical signals to navigate \
        their environment. They have extremely slow metabolisms and can survive for years without \
        food, an adaptation to nutrient-poor cave ecosystems. The olm's pale skin reflects the \
        absence of sunlight, and its long lifespan makes it one of the most evolutionarily \
        specialized cave vertebrates on Earth.",
};

pub const BACTERIA: Entry = Entry {
    name: "Cave Bacteria 🦠",
    description: "Cave bacteria often obtain energy by chemically reacting with minerals rather \
        than using sunlight. This process, called chemolithotrophy, allows life to exist deep \
        underground. These microbes influence cave formation and offer clues about early life on \
        Earth and possible life beyond it.",
};

/// Every entry the generator can attach.
pub const ALL: [Entry; 9] = [
    STALAGMITE,
    SPIKE,
    CRYSTAL_CLUSTER,
    STALACTITE,
    CEILING_CRYSTAL,
    FUNGUS,
    BAT,
    OLM,
    BACTERIA,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        for (i, a) in ALL.iter().enumerate() {
            for b in &ALL[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn descriptions_are_single_paragraphs() {
        for entry in ALL {
            assert!(!entry.description.contains('\n'), "{}", entry.name);
            assert!(!entry.description.contains("  "), "{}", entry.name);
        }
    }
}
