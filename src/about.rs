pub fn version_cli_text() -> String {
    format!(
        "panelgen {}\nADT panel and experiment metadata CSV builder",
        env!("CARGO_PKG_VERSION")
    )
}
