use parser_console::error::AppResult;
use parser_console::history::HistoryView;
use parser_console::shell::Shell;

pub async fn run(shell: &Shell, expand: Option<i64>) -> AppResult<()> {
    let token = shell.require_token()?;
    let mut view = HistoryView::load(&shell.state().client, &token).await;
    if view.is_empty() {
        println!("No parse history");
        return Ok(());
    }
    if let Some(id) = expand {
        view.toggle(id);
    }

    for entry in view.entries() {
        println!("{}", HistoryView::summary(entry));
        if view.expanded().is_some_and(|open| open.id == entry.id) {
            for (key, value) in entry.parameters() {
                println!("    {:<16} {}", key, value);
            }
        }
    }
    Ok(())
}
