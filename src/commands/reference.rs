use parser_console::catalog::CategoryPath;
use parser_console::error::{AppError, AppResult};
use parser_console::shell::Shell;

pub fn categories(shell: &Shell, path: Option<CategoryPath>) -> AppResult<()> {
    let catalog = &shell.state().catalog;
    let path = path.unwrap_or_default();

    let level = if path.is_empty() {
        catalog.roots()
    } else {
        let node = catalog
            .node(&path)
            .ok_or_else(|| AppError::Validation(format!("no category at path {}", path)))?;
        println!("{} (shard {})", node.name, node.shard);
        catalog.children(&path)
    };

    if level.is_empty() {
        println!("  no subcategories");
    }
    for (index, node) in level.iter().enumerate() {
        let mut child_path = path.indices().to_vec();
        child_path.push(index);
        let marker = if node.is_leaf() { "" } else { " >" };
        let id = node.id.map(|id| format!(" [id {}]", id)).unwrap_or_default();
        println!(
            "  {:<8} {}{}{}",
            CategoryPath::new(child_path),
            node.name,
            id,
            marker
        );
    }
    Ok(())
}

pub fn regions(shell: &Shell) -> AppResult<()> {
    for (code, name) in shell.state().regions.sorted() {
        println!("{}  {}", code, name);
    }
    Ok(())
}
