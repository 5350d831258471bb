use staticsite::{build::Builder, config::SiteConfig};

use crate::CleanArgs;

pub fn run(args: &CleanArgs) -> Result<(), anyhow::Error> {
    let root = super::site_root(args.dir.as_deref())?;
    let builder = Builder::new(&SiteConfig::default(), root);

    if args.dry_run {
        for page in builder.stale_pages()? {
            println!("Would delete {}", page.display());
        }
        return Ok(());
    }

    let report = builder.clean()?;
    for page in &report.removed {
        println!("Deleted {}", page.display());
    }

    if !report.is_ok() {
        for (page, e) in &report.failed {
            eprintln!("Failed to delete {}: {}", page.display(), e);
        }
        return Err(anyhow::anyhow!(
            "{} page(s) could not be deleted",
            report.failed.len()
        ));
    }

    Ok(())
}
