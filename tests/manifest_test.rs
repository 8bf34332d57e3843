use runbook_tutor::prompt::{undefined_tools, RUNBOOK_TUTOR_PROMPT};
use runbook_tutor::utils::validation::Validate;
use runbook_tutor::PackageManifest;

#[test]
fn test_shipped_manifest_is_valid() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/package.yaml");
    let manifest = PackageManifest::from_file(path).unwrap();

    manifest.validate().unwrap();
    assert!(!manifest.dependencies.pypi.is_empty());
    assert!(manifest.is_excluded("devdata/.env"));
    assert!(!manifest.is_excluded("actions.py"));
}

#[test]
fn test_shipped_template_parses() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/template.yml");
    let yaml = std::fs::read_to_string(path).unwrap();

    let spec = runbook_tutor::core::deploy::parse_template(&yaml).unwrap();
    assert_eq!(spec.retrieval_prompt, "prompts/retrieval.md");
    assert!(std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join(&spec.retrieval_prompt)
        .exists());
}

#[test]
fn test_prompt_is_consistent_with_tools() {
    assert_eq!(undefined_tools(RUNBOOK_TUTOR_PROMPT), Vec::<String>::new());
}
