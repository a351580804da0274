use std::fs;
use std::path::PathBuf;

use ifr_menu_core::{ItemKind, validate_document};
use ifr_menu_parser::config::{ImportConfig, TitleDelimiter};
use ifr_menu_parser::parser::{DanglingReference, IfrParser};
use ifr_menu_parser::report::FailureCode;
use ifr_menu_parser::{parse_ifr_dump, parse_ifr_dump_with_report};

#[test]
fn test_ami_fixture_unwraps_setup_wrapper() {
    let dump = fixture("ami-setup-paren.txt");
    let document = parse_ifr_dump(&dump, &ImportConfig::default())
        .document
        .expect("fixture should produce a document");

    assert_eq!(
        document.tab_titles(),
        vec!["Main", "Advanced", "Boot", "Save & Exit"]
    );
    let submenus: Vec<_> = document.submenus.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(submenus, vec!["0x2710", "0x2713"]);
    assert!(validate_document(&document).is_empty());
}

#[test]
fn test_ami_fixture_items() {
    let dump = fixture("ami-setup-paren.txt");
    let document = parse_ifr_dump(&dump, &ImportConfig::default())
        .document
        .expect("fixture should produce a document");

    let main = document.find_form("0x2711").expect("Main form");
    let labels: Vec<_> = main.items.iter().map(|item| item.label()).collect();
    assert_eq!(
        labels,
        vec![
            "BIOS Information",
            "BIOS Vendor",
            "Core Version",
            "System Language",
            "System Language"
        ]
    );
    let language = &main.items[4];
    assert_eq!(language.select_id(), Some("0x10"));
    assert_eq!(language.value(), Some("English"));

    let boot = document.find_form("0x2714").expect("Boot form");
    assert_eq!(boot.items[0].value(), Some("UEFI"));
    assert_eq!(boot.items[1].value(), Some("Disabled"));
    assert_eq!(boot.items[1].select_id(), Some("0x41"));

    let cpu = document.find_form("0x2713").expect("CPU form");
    assert_eq!(cpu.count_kind(ItemKind::Select), 1);
    assert_eq!(cpu.items[0].options().map(<[String]>::len), Some(2));
    assert_eq!(cpu.items[1].target(), Some("0x2712"));

    let exit = document.find_form("0x2715").expect("Save & Exit form");
    assert_eq!(exit.items[0].label(), "Save Changes and Exit");
}

#[test]
fn test_ami_fixture_report() {
    let dump = fixture("ami-setup-paren.txt");
    let run = parse_ifr_dump_with_report("ami-setup-paren.txt", &dump, &ImportConfig::default());
    let report = run.report;

    assert!(report.success);
    assert_eq!(report.form_count, 6);
    assert_eq!(report.tab_count, 4);
    assert_eq!(report.dropped_options, 1);
    assert_eq!(report.skipped_empty_text, 1);
    assert_eq!(report.orphan_items, 0);
    assert_eq!(
        report.dangling_references,
        vec![DanglingReference {
            form: "0x2712".to_string(),
            target: "0x27FF".to_string()
        }]
    );
    assert_eq!(report.unknown_opcodes.get("End"), Some(&10));
    assert_eq!(report.unknown_opcodes.get("Numeric"), Some(&1));
    assert!(report.relevant_lines > report.recognized_lines);
    assert!(report.coverage > 0.5 && report.coverage < 1.0);
    assert!(report.warnings.iter().any(|w| w.contains("undefined forms")));
}

#[test]
fn test_comma_fixture_with_comma_delimiter() {
    let dump = fixture("insyde-comma.txt");
    let config = comma_config();
    let document = parse_ifr_dump(&dump, &config)
        .document
        .expect("fixture should produce a document");

    assert_eq!(
        document.tab_titles(),
        vec!["Information", "Configuration", "Exit"]
    );
    assert_eq!(document.submenus[0].title, "Boot Options");

    let info = document.find_form("0x1").expect("Information form");
    assert_eq!(info.items[0].label(), "Processor Type");

    let boot = document.find_form("0x10").expect("Boot Options form");
    let ids: Vec<_> = boot.items.iter().filter_map(|item| item.select_id()).collect();
    assert_eq!(ids, vec!["0x130", "0x130_2"]);
    assert!(validate_document(&document).is_empty());
}

#[test]
fn test_comma_fixture_default_flags() {
    let dump = fixture("insyde-comma.txt");
    let mut config = comma_config();

    let document = parse_ifr_dump(&dump, &config).document.unwrap();
    let vt = &document.find_form("0x2").unwrap().items[0];
    assert_eq!(vt.value(), Some("Disabled"));

    config.parser.honor_default_flags = true;
    let document = parse_ifr_dump(&dump, &config).document.unwrap();
    let vt = &document.find_form("0x2").unwrap().items[0];
    assert_eq!(vt.value(), Some("Enabled"));
}

#[test]
fn test_comma_fixture_with_paren_delimiter_finds_nothing() {
    let dump = fixture("insyde-comma.txt");
    let run = parse_ifr_dump_with_report("insyde-comma.txt", &dump, &ImportConfig::default());

    assert!(!run.result.success);
    assert_eq!(run.report.failure_code, Some(FailureCode::NoForms));
    assert!(
        run.report
            .warnings
            .iter()
            .any(|w| w.contains("title delimiter"))
    );
}

#[test]
fn test_no_forms_fixture_is_soft_failure() {
    let dump = fixture("no-forms.txt");
    let run = parse_ifr_dump_with_report("no-forms.txt", &dump, &ImportConfig::default());

    assert!(run.result.document.is_none());
    assert_eq!(run.report.failure_code, Some(FailureCode::NoForms));
    assert_eq!(run.report.orphan_items, 1);
    assert_eq!(run.report.total_lines, 5);
    assert_eq!(run.report.relevant_lines, 2);
}

#[test]
fn test_unwrap_disabled_keeps_wrapper_tab() {
    let dump = fixture("ami-setup-paren.txt");
    let mut config = ImportConfig::default();
    config.parser.unwrap_single_root = false;

    let document = parse_ifr_dump(&dump, &config).document.unwrap();
    assert_eq!(document.tab_titles(), vec!["Setup"]);
    assert_eq!(document.submenus.len(), 5);
}

#[test]
fn test_scenario_two_unrelated_forms_ordered_by_id() {
    let dump = "0x1 Form: Boot (0x20)\n0x2 Text: A\n0x3 Form: Main (0x3)\n0x4 Text: B\n";
    let document = parse_ifr_dump(dump, &ImportConfig::default())
        .document
        .unwrap();
    assert_eq!(document.tab_titles(), vec!["Main", "Boot"]);
    assert!(document.submenus.is_empty());
}

#[test]
fn test_crlf_input_matches_lf_input() {
    let dump = fixture("ami-setup-paren.txt");
    let crlf = dump.replace('\n', "\r\n");
    let config = ImportConfig::default();

    let lf_forms = IfrParser::new(&config.parser).parse(&dump).forms;
    let crlf_forms = IfrParser::new(&config.parser).parse(&crlf).forms;
    assert_eq!(lf_forms, crlf_forms);
}

#[test]
fn test_reimport_yields_identical_document() {
    let dump = fixture("ami-setup-paren.txt");
    let config = ImportConfig::default();
    let first = parse_ifr_dump(&dump, &config).document.unwrap();
    let second = parse_ifr_dump(&dump, &config).document.unwrap();
    assert_eq!(first, second);
}

fn comma_config() -> ImportConfig {
    let mut config = ImportConfig::default();
    config.parser.title_delimiter = TitleDelimiter::Comma;
    config
}

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(path).expect("fixture file must be readable")
}
