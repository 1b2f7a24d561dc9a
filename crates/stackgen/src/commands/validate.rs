use super::{Context, GenerateArgs};
use colored::Colorize;
use stackgen_core::Generator;
use stackgen_core::render::hostname;

pub fn handle(args: &GenerateArgs) -> anyhow::Result<()> {
    println!("{}", "マニフェストを検証中...".blue());

    let project_dir = std::env::current_dir()?;
    let ctx = Context::load(args, &project_dir)?;
    println!(
        "マニフェスト: {}",
        ctx.manifest_path.display().to_string().cyan()
    );

    let generator = Generator::new(&ctx.config, &ctx.manifest);
    // 致命的な設定エラー（basic_auth の認証情報不足など）を検出する
    generator.render()?;

    let report = generator.report();
    println!("{}", "✓ マニフェストは正常です！".green().bold());
    println!();
    println!("サマリー:");
    println!(
        "  サービス: {}個（定義: {}個）",
        report.services.len(),
        ctx.manifest.service_count()
    );
    for service in &report.services {
        let route = match service.spec.subdomain.as_deref() {
            Some(subdomain) => hostname(subdomain, &ctx.config.domain),
            None => "(公開なし)".to_string(),
        };
        println!(
            "    - {} ({}) → {}",
            service.name.cyan(),
            service.spec.image,
            route
        );
    }
    println!("  グループ: {}個", generator.groups().len());

    super::print_warnings(report);

    Ok(())
}
