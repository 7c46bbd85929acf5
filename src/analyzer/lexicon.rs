//! Keyword tables driving the step analyzer.
//!
//! All matching is substring containment over lowercased instruction text,
//! so entries use stems where Portuguese conjugation varies ("cozinh"
//! covers cozinhe/cozinhar/cozinhando).

/// Verbs indicating a process that runs for the extracted duration.
/// Their presence raises timer-candidate confidence.
pub(crate) const COOKING_VERBS: &[&str] = &[
    "cozinh", "asse", "assar", "assando", "ferv", "frit", "refog", "grelh", "doure", "dourar",
    "descans", "apure", "reduza", "cozimento",
];

/// Pure-preparation verbs. A duration next to these is usually a quantity
/// or a rough guideline, not a countdown; they lower confidence.
pub(crate) const PREP_VERBS: &[&str] = &[
    "corte", "pique", "misture", "tempere", "rale", "lave", "descasque", "fatie", "amasse",
    "bata", "separe", "reserve",
];

/// Heat and temperature references; raise timer-candidate confidence.
pub(crate) const HEAT_TERMS: &[&str] = &[
    "fogo", "forno", "graus", "°", "chama", "fervura", "temperatura",
];

/// Any single match forces the `Hard` difficulty tier.
pub(crate) const HARD_TECHNIQUES: &[&str] = &[
    "flamb",
    "emulsion",
    "sous vide",
    "sous-vide",
    "incorpore delicadamente",
    "incorporar delicadamente",
    "temperagem",
];

/// Two or more distinct matches yield the `Medium` tier.
pub(crate) const MEDIUM_TECHNIQUES: &[&str] = &[
    "salte",
    "selar",
    "sele ",
    "grelh",
    "fogo brando",
    "fogo baixo",
    "refog",
    "reduza",
    "banho-maria",
    "ajuste o tempero",
    "prove e ajuste",
    "ponto",
];

/// Equipment keyword table: (match keyword, canonical display name).
/// Longer keywords come first so "panela de pressão" wins over "panela".
pub(crate) const EQUIPMENT_KEYWORDS: &[(&str, &str)] = &[
    ("panela de pressão", "panela de pressão"),
    ("rolo de massa", "rolo de massa"),
    ("micro-ondas", "micro-ondas"),
    ("microondas", "micro-ondas"),
    ("liquidificador", "liquidificador"),
    ("processador", "processador"),
    ("batedeira", "batedeira"),
    ("frigideira", "frigideira"),
    ("assadeira", "assadeira"),
    ("banho-maria", "banho-maria"),
    ("escorredor", "escorredor"),
    ("peneira", "peneira"),
    ("espátula", "espátula"),
    ("batedor", "batedor"),
    ("fouet", "fouet"),
    ("grelha", "grelha"),
    ("panela", "panela"),
    ("tábua", "tábua"),
    ("forma", "forma"),
    ("forno", "forno"),
];

/// Tip table: (match keyword, generated tip). Matched in order; earlier
/// entries win the limited tip slots.
pub(crate) const TIP_RULES: &[(&str, &str)] = &[
    ("fogo alto", "Não se afaste do fogão enquanto o fogo estiver alto."),
    ("forno", "Preaqueça o forno antes de começar o passo."),
    ("alho", "Alho queima rápido; doure em fogo baixo."),
    ("sal", "Prove antes de corrigir o sal."),
    ("óleo", "Cuidado com respingos de óleo quente."),
    ("azeite", "Use azeite com moderação; ele perde aroma em fogo muito alto."),
    ("descans", "Respeite o tempo de descanso para a textura certa."),
    ("ferv", "Espere a fervura plena antes de contar o tempo."),
    ("congel", "Descongele na geladeira, nunca em temperatura ambiente."),
];

/// Tip always suggested for the first step of a recipe.
pub(crate) const FIRST_STEP_TIP: &str = "Leia a receita inteira antes de começar.";
