//! Software classification over finish-event lines.
//!
//! An ordered table of (label, predicate) rows evaluated top to bottom;
//! the first matching row wins and evaluation stops. Rows are plain data
//! so operators can add or reorder entries without touching the engine.
//!
//! Three rows (`gaussian`, `orca`, `pyscf`) intentionally keep the
//! `any-of(..) OR all-of(..)` reading inherited from the production rule
//! set, where the companion keyword only constrains the last alternative.
//! See DESIGN.md before "fixing" them.

/// Substring predicate over the lowercased line text.
#[derive(Debug, Clone, Copy)]
pub enum Predicate {
    /// At least one keyword present.
    Any(&'static [&'static str]),
    /// Every keyword present.
    All(&'static [&'static str]),
    /// Any of `any` present, or every keyword of `all` present.
    AnyOrAll {
        any: &'static [&'static str],
        all: &'static [&'static str],
    },
}

impl Predicate {
    fn matches(&self, line: &str) -> bool {
        match self {
            Self::Any(keys) => keys.iter().any(|k| line.contains(k)),
            Self::All(keys) => keys.iter().all(|k| line.contains(k)),
            Self::AnyOrAll { any, all } => {
                any.iter().any(|k| line.contains(k)) || all.iter().all(|k| line.contains(k))
            }
        }
    }
}

/// Label returned when no rule matches.
pub const UNCLASSIFIED: &str = "others";

/// The classification table, first match wins.
pub const RULES: &[(&str, Predicate)] = &[
    (
        "gaussian",
        Predicate::AnyOrAll {
            any: &["g16", "g09"],
            all: &["g03", ".gjf"],
        },
    ),
    ("vasp", Predicate::All(&["vasp", "mpirun"])),
    ("qchem", Predicate::Any(&["qchem"])),
    ("cp2k", Predicate::Any(&["cp2k"])),
    ("lammps", Predicate::Any(&["lmp ", "lmp_", "lmp-", "lammps"])),
    ("amber", Predicate::Any(&["pmemd"])),
    ("gromacs", Predicate::Any(&["gmx "])),
    ("namd", Predicate::Any(&["namd2 ", "namd3 ", "charmrun"])),
    ("xtb", Predicate::Any(&["xtb "])),
    (
        "orca",
        Predicate::AnyOrAll {
            any: &["orca"],
            all: &["orca", "openmpi"],
        },
    ),
    ("nwchem", Predicate::Any(&["nwchem "])),
    ("rest", Predicate::All(&["rest", "rust"])),
    ("cfour", Predicate::Any(&["xcfour"])),
    ("molcas", Predicate::Any(&["molcas", "pymolcas "])),
    ("molpro", Predicate::Any(&["molpro"])),
    ("psi4", Predicate::Any(&["psi4"])),
    (
        "pyscf",
        Predicate::AnyOrAll {
            any: &["pyscf"],
            all: &["pyscf", "python"],
        },
    ),
    ("aims", Predicate::Any(&["aims"])),
    ("jdftx", Predicate::Any(&["jdftx"])),
    (
        "quantum espresso",
        Predicate::Any(&["pw.x", "dos.x", "bands.x", "pp.x"]),
    ),
];

/// Classify a finish-event line. `line` must already be lowercased.
pub fn classify(line: &str) -> &'static str {
    for (label, predicate) in RULES {
        if predicate.matches(line) {
            return label;
        }
    }
    UNCLASSIFIED
}
