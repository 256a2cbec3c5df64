use std::fs::File;
use std::io::{BufReader, Read};

use camino::Utf8PathBuf;
use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use swarm_bundle::manifest::{MANIFEST_PATH, SWARM_MANIFEST_PATH};
use swarm_bundle::SwarmManifest;
use zip::ZipArchive;

use crate::errors::CliError;
use crate::println_pad;

pub struct InspectArgs {
    pub file_path: String,
    pub entries: bool,
}

pub fn inspect_archive(args: InspectArgs) -> Result<()> {
    let path = Utf8PathBuf::from(&args.file_path);
    if !path.is_file() {
        return Err(CliError::file_not_found(path).into());
    }

    let file = File::open(&path).map_err(CliError::from)?;
    let mut archive = ZipArchive::new(BufReader::new(file))
        .map_err(|e| CliError::invalid_archive(path.clone(), e))?;

    println_pad!(
        "{} {}",
        "📦 Archive:".bright_blue().bold(),
        path.as_str().bright_cyan().bold()
    );
    println_pad!(
        "{} {}",
        "🗂️  Entries:".bright_green(),
        archive.len().to_string().bright_white().bold()
    );
    match archive.offset() {
        0 => println_pad!("{} {}", "🚀 Executable:".bright_green(), "no".bright_white()),
        prefix => println_pad!(
            "{} {}",
            "🚀 Executable:".bright_green(),
            format!("yes, {} byte launcher", prefix).bright_white().bold()
        ),
    }

    if let Some(manifest) = read_text(&mut archive, MANIFEST_PATH)? {
        // continuation lines start with a single space
        let unfolded = manifest.replace("\r\n ", "").replace("\n ", "");
        for line in unfolded.lines() {
            if let Some(value) = line.strip_prefix("Start-Class: ") {
                println_pad!("{} {}", "🎯 Main class:".bright_yellow(), value.bright_white());
            }
        }
    }

    match read_text(&mut archive, SWARM_MANIFEST_PATH)? {
        Some(text) => {
            let swarm = SwarmManifest::from_bytes(text.as_bytes()).into_diagnostic()?;
            println_pad!(
                "{} {}",
                "🧊 Hollow:".bright_yellow(),
                swarm.hollow.to_string().bright_white()
            );
            println_pad!(
                "{} {}",
                "📥 Bundled dependencies:".bright_yellow(),
                swarm.bundle_dependencies.to_string().bright_white()
            );

            println_pad!("\n{}", "🔗 Dependencies:".bright_magenta().bold());
            for dependency in &swarm.dependencies {
                println_pad!("   {} {}", "•".bright_cyan(), dependency.bright_white());
            }
            if !swarm.modules.is_empty() {
                println_pad!("\n{}", "🧩 Modules:".bright_magenta().bold());
                for module in &swarm.modules {
                    println_pad!("   {} {}", "•".bright_cyan(), module.bright_white());
                }
            }
            if !swarm.properties.is_empty() {
                println_pad!("\n{}", "⚙️  Properties:".bright_magenta().bold());
                for (key, value) in &swarm.properties {
                    println_pad!("   {} {} = {}", "•".bright_cyan(), key.bright_white(), value);
                }
            }
        }
        None => println_pad!(
            "{}",
            "⚠️  No swarm manifest, this is not a swarm archive".bright_yellow()
        ),
    }

    if args.entries {
        println_pad!("\n{}", "🧾 Entries:".bright_magenta().bold());
        for name in archive.file_names() {
            println_pad!("   {}", name);
        }
    }

    Ok(())
}

fn read_text(archive: &mut ZipArchive<BufReader<File>>, name: &str) -> Result<Option<String>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e).into_diagnostic(),
    };
    let mut text = String::new();
    entry.read_to_string(&mut text).into_diagnostic()?;
    Ok(Some(text))
}
