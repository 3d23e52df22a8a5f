//! Field classifier for single text tokens found in a place dump.
//!
//! Each field kind owns an ordered table of named [`Rule`]s. A token is a
//! candidate for a kind when it passes every rule in [`BASE_RULES`] and every
//! rule in that kind's table. The tables are tuned to Brazilian postal and
//! phone conventions.

use crate::types::FieldKind;

/// Search-box placeholder texts that leak into the dump.
pub(crate) const UI_PLACEHOLDERS: &[&str] = &["Pesquisar", "Search"];

/// Private-use glyphs used for Maps icons.
pub(crate) const ICON_GLYPHS: &[char] = &['\u{e0c8}', '\u{e0b0}'];

pub(crate) const STAR_GLYPHS: &[char] = &['★', '☆'];

/// Internal identifiers that look like words but never name a business.
pub(crate) const RESERVED_PREFIXES: &[&str] = &["0x", "sc2", "spotlit"];

pub(crate) const NAME_EXCLUDED_KEYWORDS: &[&str] = &["Telefone", "CEP", "Pesquisar"];

pub(crate) const DOMAIN_SUFFIXES: &[&str] = &[".com", ".net", ".org", ".br"];

pub(crate) const STATE_CODES: &[&str] = &[
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB",
    "PR", "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];

pub(crate) const STATE_NAMES: &[&str] = &[
    "acre",
    "alagoas",
    "amapá",
    "amazonas",
    "bahia",
    "ceará",
    "distrito federal",
    "espírito santo",
    "goiás",
    "maranhão",
    "mato grosso",
    "mato grosso do sul",
    "minas gerais",
    "pará",
    "paraíba",
    "paraná",
    "pernambuco",
    "piauí",
    "rio de janeiro",
    "rio grande do norte",
    "rio grande do sul",
    "rondônia",
    "roraima",
    "santa catarina",
    "são paulo",
    "sergipe",
    "tocantins",
];

pub(crate) const ADDRESS_KEYWORDS: &[&str] = &[
    "Rua",
    "Av.",
    "Avenida",
    "Centro",
    "CEP",
    "Travessa",
    "Praça",
    "Rodovia",
    "Estrada",
    "Alameda",
    "Loteamento",
    "Bairro",
    "Condomínio",
    "Vila",
    "Distrito",
    "Quadra",
    "Bloco",
    "Edifício",
    "Galeria",
];

pub(crate) const CITIES: &[&str] = &[
    "divinópolis",
    "são paulo",
    "rio de janeiro",
    "salvador",
    "porto alegre",
    "curitiba",
    "belo horizonte",
    "fortaleza",
    "manaus",
    "recife",
    "goiânia",
    "belém",
    "campinas",
    "são luís",
    "maceió",
    "duque de caxias",
    "natal",
    "teresina",
    "são gonçalo",
    "joão pessoa",
    "cuiabá",
    "campo grande",
    "são bernardo",
    "nova iguaçu",
    "santo andré",
    "osasco",
    "são josé dos campos",
    "jaboatão",
    "são josé do rio preto",
    "ribeirão preto",
    "uberlândia",
    "londrina",
    "joinville",
    "juiz de fora",
    "aparecida de goiânia",
    "anapolis",
    "serra",
    "sorocaba",
    "niterói",
    "caxias do sul",
    "florianópolis",
    "vila velha",
    "mauá",
    "carapicuíba",
    "santos",
    "guarulhos",
    "barueri",
    "são vicente",
    "cariacica",
    "caucaia",
    "itabuna",
    "ilhéus",
    "aracaju",
    "palmas",
    "macapá",
    "rio branco",
    "boa vista",
];

/// Lower-cased address and phone labels that disqualify a category.
pub(crate) const CATEGORY_EXCLUDED_KEYWORDS: &[&str] =
    &["rua", "av.", "avenida", "cep", "telefone", "centro", ".com"];

/// A trimmed token with the derived forms the rules need.
#[derive(Debug, Clone)]
pub struct Token<'a> {
    text: &'a str,
    lower: String,
    chars: usize,
}

impl<'a> Token<'a> {
    /// Trim `raw`; returns `None` for blank input.
    #[must_use]
    pub fn new(raw: &'a str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text,
            lower: text.to_lowercase(),
            chars: text.chars().count(),
        })
    }

    #[must_use]
    pub fn text(&self) -> &'a str {
        self.text
    }
}

/// A named acceptance predicate. A token passes a rule when `check` returns
/// `true`.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub check: fn(&Token<'_>) -> bool,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Rule").field(&self.name).finish()
    }
}

/// Applied to every token before any field table.
pub const BASE_RULES: &[Rule] = &[
    Rule { name: "min_length", check: min_length },
    Rule { name: "not_placeholder", check: not_placeholder },
    Rule { name: "no_icon_glyph", check: no_icon_glyph },
    Rule { name: "no_star_glyph", check: no_star_glyph },
];

pub const NAME_RULES: &[Rule] = &[
    Rule { name: "name_length", check: name_length },
    Rule { name: "no_contact_symbols", check: name_no_contact_symbols },
    Rule { name: "no_link", check: no_link },
    Rule { name: "no_domain_suffix", check: no_domain_suffix },
    Rule { name: "no_digits", check: no_digits },
    Rule { name: "no_excluded_keyword", check: name_no_excluded_keyword },
    Rule { name: "no_reserved_prefix", check: no_reserved_prefix },
];

pub const ADDRESS_RULES: &[Rule] = &[
    Rule { name: "address_marker", check: address_marker },
    Rule { name: "address_length", check: address_length },
];

pub const PHONE_RULES: &[Rule] = &[Rule { name: "phone_shape", check: phone_shape }];

pub const CATEGORY_RULES: &[Rule] = &[
    Rule { name: "category_length", check: category_length },
    Rule { name: "no_digits", check: no_digits },
    Rule { name: "no_contact_symbols", check: category_no_contact_symbols },
    Rule { name: "not_phone_prefix", check: not_phone_prefix },
    Rule { name: "no_city", check: no_city },
    Rule { name: "no_state", check: no_state },
    Rule { name: "no_address_or_phone_keyword", check: category_no_excluded_keyword },
];

/// The rule table for `kind`, excluding [`BASE_RULES`].
#[must_use]
pub fn rules_for(kind: FieldKind) -> &'static [Rule] {
    match kind {
        FieldKind::Name => NAME_RULES,
        FieldKind::Address => ADDRESS_RULES,
        FieldKind::Phone => PHONE_RULES,
        FieldKind::Category => CATEGORY_RULES,
    }
}

/// Name of the first rule `raw` fails for `kind`, or `None` when it is a
/// candidate. Blank input fails `min_length`.
#[must_use]
pub fn first_failed_rule(raw: &str, kind: FieldKind) -> Option<&'static str> {
    let Some(token) = Token::new(raw) else {
        return Some("min_length");
    };
    BASE_RULES
        .iter()
        .chain(rules_for(kind))
        .find(|rule| !(rule.check)(&token))
        .map(|rule| rule.name)
}

/// Whether `token` is a candidate for `kind`.
#[must_use]
pub fn matches(token: &Token<'_>, kind: FieldKind) -> bool {
    BASE_RULES
        .iter()
        .chain(rules_for(kind))
        .all(|rule| (rule.check)(token))
}

/// Every field kind `raw` plausibly represents, in [`FieldKind::ALL`] order.
/// An empty result means "none".
#[must_use]
pub fn classify(raw: &str) -> Vec<FieldKind> {
    let Some(token) = Token::new(raw) else {
        return Vec::new();
    };
    FieldKind::ALL
        .into_iter()
        .filter(|kind| matches(&token, *kind))
        .collect()
}

fn min_length(t: &Token<'_>) -> bool {
    t.chars >= 3
}

fn not_placeholder(t: &Token<'_>) -> bool {
    !UI_PLACEHOLDERS.iter().any(|p| *p == t.text)
}

fn no_icon_glyph(t: &Token<'_>) -> bool {
    !t.text.starts_with(ICON_GLYPHS)
}

fn no_star_glyph(t: &Token<'_>) -> bool {
    !t.text.starts_with(STAR_GLYPHS)
}

fn name_length(t: &Token<'_>) -> bool {
    t.chars > 2 && t.chars < 80
}

fn name_no_contact_symbols(t: &Token<'_>) -> bool {
    !t.text.contains(['@', '+', '(', ')'])
}

fn no_link(t: &Token<'_>) -> bool {
    !t.lower.contains("http")
}

fn no_domain_suffix(t: &Token<'_>) -> bool {
    !DOMAIN_SUFFIXES.iter().any(|s| t.lower.contains(s))
}

fn no_digits(t: &Token<'_>) -> bool {
    !t.text.chars().any(char::is_numeric)
}

fn name_no_excluded_keyword(t: &Token<'_>) -> bool {
    !NAME_EXCLUDED_KEYWORDS.iter().any(|k| t.text.contains(k))
}

fn no_reserved_prefix(t: &Token<'_>) -> bool {
    !RESERVED_PREFIXES.iter().any(|p| t.text.starts_with(p))
}

fn address_marker(t: &Token<'_>) -> bool {
    has_state_suffix(t.text) || ADDRESS_KEYWORDS.iter().any(|k| t.text.contains(k))
}

fn address_length(t: &Token<'_>) -> bool {
    t.chars > 10
}

fn phone_shape(t: &Token<'_>) -> bool {
    t.text
        .strip_prefix('(')
        .is_some_and(|rest| rest.contains(") "))
        || t.text.starts_with('+')
}

fn category_length(t: &Token<'_>) -> bool {
    t.chars > 2 && t.chars < 50
}

fn category_no_contact_symbols(t: &Token<'_>) -> bool {
    !t.text.contains(['@', '+'])
}

fn not_phone_prefix(t: &Token<'_>) -> bool {
    !t.text.starts_with(['(', '+'])
}

fn no_city(t: &Token<'_>) -> bool {
    !CITIES.iter().any(|c| t.lower.contains(c))
}

/// State abbreviations count only as whole words; full state names match as
/// substrings.
fn no_state(t: &Token<'_>) -> bool {
    let by_code = t
        .lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| STATE_CODES.iter().any(|uf| uf.eq_ignore_ascii_case(word)));
    !(by_code || STATE_NAMES.iter().any(|name| t.lower.contains(name)))
}

fn category_no_excluded_keyword(t: &Token<'_>) -> bool {
    !CATEGORY_EXCLUDED_KEYWORDS
        .iter()
        .any(|k| t.lower.contains(k))
}

/// `" - XX"` where `XX` is a state code not followed by another letter or digit.
fn has_state_suffix(text: &str) -> bool {
    STATE_CODES.iter().any(|uf| {
        text.match_indices(*uf).any(|(idx, _)| {
            text[..idx].ends_with("- ")
                && !text[idx + uf.len()..]
                    .chars()
                    .next()
                    .is_some_and(char::is_alphanumeric)
        })
    })
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod tests;
