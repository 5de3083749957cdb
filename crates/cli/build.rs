use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("marksift")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert article web pages into clean Markdown")
        .arg(clap::arg!(<INPUT> "URL to fetch, local HTML file, or '-' for stdin"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (markdown, json)")
                .value_name("FORMAT")
                .default_value("markdown")
                .value_parser(["markdown", "json"]),
        )
        .arg(clap::arg!(--url <URL> "Source URL used to pick a site profile for file or stdin input"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("15"))
        .arg(clap::arg!(--"user-agent" <UA> "Custom User-Agent for HTTP requests").value_name("UA"))
        .arg(
            clap::arg!(--threshold <NUM> "Minimum profile content length before the generic fallback is used")
                .default_value("100"),
        )
        .arg(
            clap::arg!(--profiles <FILE> "JSON file of extra site profiles")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--"title-heading" "Prefix the output with the title as a level-one heading"))
        .arg(clap::arg!(--"no-gfm" "Disable tables and task-list checkboxes"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "marksift", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "marksift", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "marksift", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "marksift", &completions_dir).unwrap();
}
