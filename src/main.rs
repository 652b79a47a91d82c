use clap::Parser;
use tnf_scan::cli::Cli;
use tnf_scan::config::Config;
use tnf_scan::error::Result;
use tnf_scan::ges::{GesAutomation, NoopNotifier};
use tnf_scan::session::SessionContext;
use tnf_scan::{manifest, picker, session};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(name) = cli.xml_name.clone() {
        config.xml_filename = name;
    }

    println!("📷 tnf-scan - スキャンセッション\n");

    // 1. 作業ディレクトリ
    let working_dir = picker::prompt_for_working_directory(cli.working_dir.clone())?;
    println!("\n作業ディレクトリ:\n  {}\n", working_dir.display());

    // 2. マニフェスト
    let manifest_path = match cli.manifest.clone() {
        Some(path) => path,
        None => picker::pick_manifest_file(&working_dir)?,
    };
    let rows = manifest::load_rows(&manifest_path)?;
    println!(
        "✔ マニフェスト読み込み: {} ({}行)\n",
        manifest_path.display(),
        rows.len()
    );

    // 3. スキャンループ
    let mut ctx = SessionContext::new(working_dir, manifest_path, rows);

    if cli.no_mark_shot || !config.mark_shot_enabled {
        if cli.verbose {
            println!("GES連携は無効です");
        }
        session::run_session(&mut ctx, &config, &NoopNotifier, cli.verbose).await?;
    } else {
        let notifier = GesAutomation::new(
            config.automation_stage_timeout_seconds,
            config.automation_render_wait_seconds,
        );
        session::run_session(&mut ctx, &config, &notifier, cli.verbose).await?;
    }

    Ok(())
}
