use super::EXIT_SUCCESS;
use clap::{Command, CommandFactory};
use std::path::Path;

/// Write `<bin>.1` plus one `<bin>-<subcommand>.1` page per subcommand.
pub fn run<C: CommandFactory>(dir: &Path) -> Result<u8, String> {
    std::fs::create_dir_all(dir)
        .map_err(|e| format!("failed to create {}: {e}", dir.display()))?;
    let cmd = C::command();
    let bin = cmd.get_name().to_owned();

    let mut written = vec![write_page(cmd.clone(), dir, &bin)?];
    for sub in cmd.get_subcommands() {
        written.push(write_page(
            sub.clone(),
            dir,
            &format!("{bin}-{}", sub.get_name()),
        )?);
    }
    println!("{} man pages written to {}", written.len(), dir.display());
    Ok(EXIT_SUCCESS)
}

fn write_page(cmd: Command, dir: &Path, stem: &str) -> Result<String, String> {
    let mut buf = Vec::new();
    clap_mangen::Man::new(cmd)
        .render(&mut buf)
        .map_err(|e| format!("man page render failed for {stem}: {e}"))?;
    let file = format!("{stem}.1");
    let path = dir.join(&file);
    std::fs::write(&path, &buf).map_err(|e| format!("failed to write {}: {e}", path.display()))?;
    Ok(file)
}
