use tivar_standards::embedded::{TOKENS_CE, TOKENS_COLOR, TOKENS_CORE, TOKENS_TI84};
use tivar_standards::models::{BuiltinCatalog, MODELS, ModelCatalog, TI_82, TI_84PCE, TI_84PCSE};
use tivar_standards::tokens::{BuiltinTokens, TokenSource, load_table_from_str};

#[test]
fn embedded_layers_parse() {
    for (name, content) in [
        ("core.csv", TOKENS_CORE),
        ("ti84.csv", TOKENS_TI84),
        ("color.csv", TOKENS_COLOR),
        ("ce.csv", TOKENS_CE),
    ] {
        let table = load_table_from_str(content, name).expect(name);
        assert!(!table.is_empty(), "{name} should not be empty");
    }
}

#[test]
fn every_model_has_a_table() {
    for model in MODELS {
        let table = BuiltinTokens.table_for(model).expect("table");
        assert_eq!(table.single(0x41), Some("A"), "{model}");
        assert_eq!(table.single(0x3F), Some("\n"), "{model}");
    }
}

#[test]
fn generation_specific_tokens() {
    let ti82 = BuiltinTokens.table_for(&TI_82).unwrap();
    let cse = BuiltinTokens.table_for(&TI_84PCSE).unwrap();
    let ce = BuiltinTokens.table_for(&TI_84PCE).unwrap();

    assert_eq!(ti82.double(0xBB, 0xB0), None);
    assert_eq!(cse.double(0xBB, 0xB0), Some("a"));
    assert_eq!(cse.double(0xEF, 0x41), Some("BLUE"));
    assert_eq!(cse.double(0xEF, 0x97), None);
    assert_eq!(ce.double(0xEF, 0x97), Some("toString("));
    assert_eq!(ce.double(0xEF, 0x00), Some("setDate("));
}

#[test]
fn equation_vars_keep_their_encoding() {
    let ce = BuiltinTokens.table_for(BuiltinCatalog.find("TI-84+CE").unwrap()).unwrap();
    assert_eq!(ce.encode_display("u"), Some(&[0x5E, 0x80][..]));
    assert_eq!(ce.encode_display("Y1"), Some(&[0x5E, 0x10][..]));
    assert_eq!(ce.encode_display("Str0"), Some(&[0xAA, 0x09][..]));
}
