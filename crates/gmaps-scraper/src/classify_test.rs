use super::*;

fn is(raw: &str, kind: FieldKind) -> bool {
    classify(raw).contains(&kind)
}

// -----------------------------------------------------------------------
// Base rules
// -----------------------------------------------------------------------

#[test]
fn short_and_blank_tokens_match_nothing() {
    assert!(classify("").is_empty());
    assert!(classify("   ").is_empty());
    assert!(classify("ab").is_empty());
    assert_eq!(first_failed_rule("ab", FieldKind::Name), Some("min_length"));
}

#[test]
fn placeholder_is_rejected() {
    assert!(classify("Pesquisar").is_empty());
    assert!(classify("  Pesquisar  ").is_empty());
    assert_eq!(
        first_failed_rule("Pesquisar", FieldKind::Category),
        Some("not_placeholder")
    );
}

#[test]
fn icon_and_star_glyphs_are_rejected() {
    assert!(classify("\u{e0c8} Rua das Flores, 123 - MG").is_empty());
    assert!(classify("\u{e0b0}Padaria").is_empty());
    assert!(classify("★★★★").is_empty());
    assert!(classify("☆ Padaria Bom Pão").is_empty());
}

#[test]
fn token_is_trimmed_before_checks() {
    let token = Token::new("  Padaria Bom Pão \n").unwrap();
    assert_eq!(token.text(), "Padaria Bom Pão");
    assert!(matches(&token, FieldKind::Name));
}

// -----------------------------------------------------------------------
// Name
// -----------------------------------------------------------------------

#[test]
fn plain_business_name_is_a_name() {
    assert!(is("Padaria Bom Pão", FieldKind::Name));
    assert!(is("Café Central", FieldKind::Name));
}

#[test]
fn name_rejects_contact_like_text() {
    assert!(!is("contato@padaria", FieldKind::Name));
    assert!(!is("Padaria (Matriz)", FieldKind::Name));
    assert!(!is("padaria.com", FieldKind::Name));
    assert!(!is("https padaria", FieldKind::Name));
    assert!(!is("Telefone comercial", FieldKind::Name));
}

#[test]
fn name_rejects_reserved_prefixes() {
    assert_eq!(
        first_failed_rule("spotlit_result", FieldKind::Name),
        Some("no_reserved_prefix")
    );
    assert!(!is("sc2abcdef", FieldKind::Name));
}

#[test]
fn name_rejects_hex_identifier() {
    assert!(!is("0x1f3e0cafe", FieldKind::Name));
}

#[test]
fn name_length_upper_bound_is_exclusive() {
    let long = "a".repeat(80);
    assert!(!is(&long, FieldKind::Name));
    let fits = "a".repeat(79);
    assert!(is(&fits, FieldKind::Name));
}

#[test]
fn name_length_counts_characters_not_bytes() {
    // 79 two-byte characters stay under the limit.
    let accented = "ã".repeat(79);
    assert!(is(&accented, FieldKind::Name));
}

// -----------------------------------------------------------------------
// Address
// -----------------------------------------------------------------------

#[test]
fn street_with_state_suffix_is_an_address() {
    assert!(is("Rua das Flores, 123 - MG", FieldKind::Address));
    assert!(is("Quinta dos Ipês, 45 - SP", FieldKind::Address));
}

#[test]
fn every_address_keyword_triggers_with_enough_length() {
    for keyword in ADDRESS_KEYWORDS {
        let token = format!("{keyword} Principal 100");
        assert!(
            is(&token, FieldKind::Address),
            "expected {token:?} to classify as address"
        );
    }
}

#[test]
fn every_state_suffix_triggers_with_enough_length() {
    for uf in STATE_CODES {
        let token = format!("Loja Matriz 10 - {uf}");
        assert!(
            is(&token, FieldKind::Address),
            "expected {token:?} to classify as address"
        );
    }
}

#[test]
fn short_address_is_rejected() {
    assert!(!is("Rua A, 1", FieldKind::Address));
    assert_eq!(
        first_failed_rule("Rua A, 1", FieldKind::Address),
        Some("address_length")
    );
}

#[test]
fn text_without_marker_is_not_an_address() {
    assert!(!is("Padaria Bom Pão e Confeitaria", FieldKind::Address));
}

#[test]
fn state_code_inside_a_word_is_not_a_suffix() {
    assert!(!is("Marca registrada - MGX", FieldKind::Address));
}

// -----------------------------------------------------------------------
// Phone
// -----------------------------------------------------------------------

#[test]
fn parenthesized_area_code_is_a_phone() {
    assert!(is("(37) 3222-1000", FieldKind::Phone));
}

#[test]
fn plus_prefixed_number_is_a_phone() {
    assert!(is("+55 37 3222-1000", FieldKind::Phone));
}

#[test]
fn parenthesis_without_closing_space_is_not_a_phone() {
    assert!(!is("(37)3222-1000", FieldKind::Phone));
    assert!(!is("37 3222-1000", FieldKind::Phone));
}

// -----------------------------------------------------------------------
// Category
// -----------------------------------------------------------------------

#[test]
fn plain_category_is_a_category() {
    assert!(is("Padaria", FieldKind::Category));
    assert!(is("Restaurante", FieldKind::Category));
    assert!(is("Loja de roupas", FieldKind::Category));
}

#[test]
fn category_rejects_city_names() {
    assert!(!is("Padaria em Divinópolis", FieldKind::Category));
    assert_eq!(
        first_failed_rule("Belo Horizonte", FieldKind::Category),
        Some("no_city")
    );
}

#[test]
fn category_rejects_state_codes_and_names() {
    assert!(!is("Padaria MG", FieldKind::Category));
    assert!(!is("Comida de Minas Gerais", FieldKind::Category));
}

#[test]
fn state_tables_cover_every_federative_unit() {
    assert_eq!(STATE_CODES.len(), 27);
    assert_eq!(STATE_NAMES.len(), STATE_CODES.len());
}

#[test]
fn category_rejects_every_state_name_alone() {
    for name in STATE_NAMES {
        assert!(!is(name, FieldKind::Category), "{name} passed as category");
        let shouted = name.to_uppercase();
        assert!(!is(&shouted, FieldKind::Category), "{shouted} passed as category");
    }
    assert!(!is("Pará", FieldKind::Category));
    assert!(is("Bahia Lanches", FieldKind::Name));
}

#[test]
fn category_rejects_address_and_phone_labels() {
    assert!(!is("Centro comercial", FieldKind::Category));
    assert!(!is("Telefone fixo", FieldKind::Category));
    assert!(!is("Avenida", FieldKind::Category));
}

#[test]
fn category_length_upper_bound_is_exclusive() {
    assert!(!is(&"b".repeat(50), FieldKind::Category));
    assert!(is(&"b".repeat(49), FieldKind::Category));
}

// -----------------------------------------------------------------------
// Cross-field properties
// -----------------------------------------------------------------------

#[test]
fn tokens_with_digits_are_never_names_or_categories() {
    let samples = [
        "Padaria 24 horas",
        "0x1f3e0cafe",
        "Loja 1",
        "Rua das Flores, 123 - MG",
        "(37) 3222-1000",
        "Bar do Zé ٣",
        "Studio ²",
    ];
    for sample in samples {
        let kinds = classify(sample);
        assert!(
            !kinds.contains(&FieldKind::Name) && !kinds.contains(&FieldKind::Category),
            "{sample:?} classified as {kinds:?}"
        );
    }
}

#[test]
fn classify_reports_kinds_in_field_order() {
    // An address without digits also passes the name table.
    let kinds = classify("Rua das Flores - MG");
    assert_eq!(kinds, vec![FieldKind::Name, FieldKind::Address]);
}

#[test]
fn each_table_has_uniquely_named_rules() {
    for kind in FieldKind::ALL {
        let mut names: Vec<&str> = rules_for(kind).iter().map(|r| r.name).collect();
        let before = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(before, names.len(), "duplicate rule name in {kind} table");
    }
}
