use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("folio")
        .version("1.0.0")
        .author("Folio Contributors")
        .about("Split a periodical e-book into standalone article pages")
        .arg(clap::arg!(<INPUT> "Extracted issue directory or .epub file"))
        .arg(
            clap::arg!(-o --output <DIR> "Output directory")
                .value_name("DIR")
                .default_value("output")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(--profile <FILE> "Profile file with pipeline directives")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(--"allow-section" <NAME> "Section to keep (repeatable; replaces the default list)")
                .value_name("NAME")
                .action(clap::ArgAction::Append),
        )
        .arg(clap::arg!(--"all-sections" "Keep articles from every section"))
        .arg(clap::arg!(--"min-body-chars" <NUM> "Minimum body length in characters").value_name("NUM"))
        .arg(clap::arg!(--"max-slug-len" <NUM> "Maximum slug length in characters").value_name("NUM"))
        .arg(clap::arg!(--"label-max-chars" <NUM> "Length limit for all-caps section labels").value_name("NUM"))
        .arg(clap::arg!(--"base-url" <URL> "Absolute URL the site is published under").value_name("URL"))
        .arg(clap::arg!(--title <TITLE> "Site and feed title").value_name("TITLE"))
        .arg(clap::arg!(--json "Print the article manifest to stdout"))
        .arg(clap::arg!(--"keep-work" "Keep the extraction directory for .epub input"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "folio", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "folio", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "folio", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "folio", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
