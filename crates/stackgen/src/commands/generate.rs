use super::{Context, GenerateArgs};
use colored::Colorize;
use stackgen_core::Generator;
use stackgen_core::output::{self, AUXILIARY_FILES};

pub fn handle(args: &GenerateArgs, clean: bool) -> anyhow::Result<()> {
    println!("{}", "成果物を生成中...".blue());

    let project_dir = std::env::current_dir()?;
    let ctx = Context::load(args, &project_dir)?;
    println!(
        "マニフェスト: {}",
        ctx.manifest_path.display().to_string().cyan()
    );

    let generator = Generator::new(&ctx.config, &ctx.manifest);
    // 書き出し前にすべて生成し、失敗時は何も書かない
    let artifacts = generator.render()?;

    let output_dir = ctx.output_dir(args);
    if clean {
        let protected = [ctx.project_dir.as_path(), ctx.manifest_path.as_path()];
        output::clean_output_dir(&output_dir, &protected)?;
        println!("{}", "出力ディレクトリを削除しました".dimmed());
    }

    let copied = output::copy_auxiliary_files(&ctx.project_dir, &output_dir, AUXILIARY_FILES)?;
    let written = output::write_artifacts(&artifacts, &output_dir)?;

    let report = generator.report();
    println!();
    println!("{}", "✓ 生成が完了しました".green().bold());
    println!();
    println!("サマリー:");
    println!("  ドメイン: {}", ctx.config.domain.cyan());
    println!(
        "  サービス: {}個（除外: {}個）",
        report.services.len(),
        report.excluded().count()
    );
    println!("  出力先: {}", output_dir.display().to_string().cyan());
    for path in written.iter().chain(copied.iter()) {
        if let Some(name) = path.file_name() {
            println!("    - {}", name.to_string_lossy());
        }
    }

    super::print_warnings(report);

    Ok(())
}
