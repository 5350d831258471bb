use staticsite::{build::Builder, config::SiteConfig};

use crate::BuildArgs;

pub fn run(args: &BuildArgs) -> Result<(), anyhow::Error> {
    let root = super::site_root(args.dir.as_deref())?;

    let mut config = SiteConfig::load(&root, args.config_file.as_deref())?;
    if args.keep_going {
        config.keep_going = true;
    }

    let mut builder = Builder::new(&config, root);
    let report = builder.generate_site()?;

    println!(
        "Built {} page(s) in {} (removed {} stale page(s), skipped {} other file(s))",
        report.pages.len(),
        builder.root().display(),
        report.removed,
        report.skipped
    );

    if !report.is_ok() {
        for failure in &report.failures {
            eprintln!("  - {}", failure);
        }
        return Err(anyhow::anyhow!(
            "{} file(s) failed to build",
            report.failures.len()
        ));
    }

    Ok(())
}
