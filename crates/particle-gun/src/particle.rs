//! Primary particle types known by name to the Geant4 particle table

use gun_units::MeV;

/// Common primaries, named as Geant4 names them
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    Electron = 0,
    Positron = 1,
    MuonMinus = 2,
    MuonPlus = 3,
    PionPlus = 4,
    PionMinus = 5,
    PionZero = 6,
    KaonPlus = 7,
    KaonMinus = 8,
    KaonZeroLong = 9,
    Proton = 10,
    AntiProton = 11,
    Neutron = 12,
    Gamma = 13,
    Geantino = 14,
    ChargedGeantino = 15,
}

impl ParticleKind {
    pub const ALL: [ParticleKind; 16] = [
        ParticleKind::Electron,
        ParticleKind::Positron,
        ParticleKind::MuonMinus,
        ParticleKind::MuonPlus,
        ParticleKind::PionPlus,
        ParticleKind::PionMinus,
        ParticleKind::PionZero,
        ParticleKind::KaonPlus,
        ParticleKind::KaonMinus,
        ParticleKind::KaonZeroLong,
        ParticleKind::Proton,
        ParticleKind::AntiProton,
        ParticleKind::Neutron,
        ParticleKind::Gamma,
        ParticleKind::Geantino,
        ParticleKind::ChargedGeantino,
    ];

    /// Look up a particle by its Geant4 name (`"pi+"`, `"e-"`, `"proton"`, ...)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Geant4 particle name
    pub fn name(self) -> &'static str {
        match self {
            ParticleKind::Electron => "e-",
            ParticleKind::Positron => "e+",
            ParticleKind::MuonMinus => "mu-",
            ParticleKind::MuonPlus => "mu+",
            ParticleKind::PionPlus => "pi+",
            ParticleKind::PionMinus => "pi-",
            ParticleKind::PionZero => "pi0",
            ParticleKind::KaonPlus => "kaon+",
            ParticleKind::KaonMinus => "kaon-",
            ParticleKind::KaonZeroLong => "kaon0L",
            ParticleKind::Proton => "proton",
            ParticleKind::AntiProton => "anti_proton",
            ParticleKind::Neutron => "neutron",
            ParticleKind::Gamma => "gamma",
            ParticleKind::Geantino => "geantino",
            ParticleKind::ChargedGeantino => "chargedgeantino",
        }
    }

    /// PDG Monte Carlo code (Geant4 uses 0 for the geantinos)
    pub fn pdg_code(self) -> i32 {
        match self {
            ParticleKind::Electron => 11,
            ParticleKind::Positron => -11,
            ParticleKind::MuonMinus => 13,
            ParticleKind::MuonPlus => -13,
            ParticleKind::PionPlus => 211,
            ParticleKind::PionMinus => -211,
            ParticleKind::PionZero => 111,
            ParticleKind::KaonPlus => 321,
            ParticleKind::KaonMinus => -321,
            ParticleKind::KaonZeroLong => 130,
            ParticleKind::Proton => 2212,
            ParticleKind::AntiProton => -2212,
            ParticleKind::Neutron => 2112,
            ParticleKind::Gamma => 22,
            ParticleKind::Geantino | ParticleKind::ChargedGeantino => 0,
        }
    }

    /// Electric charge in units of e
    pub fn charge(self) -> f64 {
        match self {
            ParticleKind::Positron
            | ParticleKind::MuonPlus
            | ParticleKind::PionPlus
            | ParticleKind::KaonPlus
            | ParticleKind::Proton
            | ParticleKind::ChargedGeantino => 1.0,
            ParticleKind::Electron
            | ParticleKind::MuonMinus
            | ParticleKind::PionMinus
            | ParticleKind::KaonMinus
            | ParticleKind::AntiProton => -1.0,
            ParticleKind::PionZero
            | ParticleKind::KaonZeroLong
            | ParticleKind::Neutron
            | ParticleKind::Gamma
            | ParticleKind::Geantino => 0.0,
        }
    }

    /// Rest mass in internal energy units (PDG 2022 values)
    pub fn mass(self) -> f64 {
        let mev = match self {
            ParticleKind::Electron | ParticleKind::Positron => 0.51099895,
            ParticleKind::MuonMinus | ParticleKind::MuonPlus => 105.6583755,
            ParticleKind::PionPlus | ParticleKind::PionMinus => 139.57039,
            ParticleKind::PionZero => 134.9768,
            ParticleKind::KaonPlus | ParticleKind::KaonMinus => 493.677,
            ParticleKind::KaonZeroLong => 497.611,
            ParticleKind::Proton | ParticleKind::AntiProton => 938.27208816,
            ParticleKind::Neutron => 939.56542052,
            ParticleKind::Gamma | ParticleKind::Geantino | ParticleKind::ChargedGeantino => 0.0,
        };
        mev * MeV
    }

    pub fn is_charged(self) -> bool {
        self.charge() != 0.0
    }

    /// Compact form of the name for file names and run tags
    pub fn short_tag(self) -> String {
        particle_tag(self.name())
    }
}

/// File-name safe tag for any particle name: `pi+` -> `pip`, `e-` -> `em`
pub fn particle_tag(name: &str) -> String {
    name.chars()
        .filter_map(|c| match c {
            '+' => Some('p'),
            '-' => Some('m'),
            c if c.is_ascii_alphanumeric() => Some(c.to_ascii_lowercase()),
            _ => None,
        })
        .collect()
}

impl std::fmt::Display for ParticleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
