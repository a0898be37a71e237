//! HTML for the index page.
use std::fmt::Write;
use todo::Item;

/// Renders the full page for `items`, which must already be in display order.
pub fn index_page(items: &[Item], max_title_length: usize) -> String {
    let mut rows = String::new();
    for item in items {
        let class = if item.done { "todo done" } else { "todo" };
        let action = if item.done { "Undo" } else { "Done" };
        // Writing to a String cannot fail.
        let _ = write!(
            rows,
            r#"
      <li class="{class}">
        <span class="title">{title}</span>
        <time datetime="{created}">{created_short}</time>
        <form method="post" action="/done/{id}"><button type="submit">{action}</button></form>
        <form method="post" action="/clear/{id}"><button type="submit">Clear</button></form>
      </li>"#,
            id = item.id,
            title = escape(&item.title),
            created = item.created_at.to_rfc3339(),
            created_short = item.created_at.format("%Y-%m-%d %H:%M"),
        );
    }

    let list = if items.is_empty() {
        r#"<p class="empty">Nothing to do.</p>"#.to_string()
    } else {
        format!(r#"<ul class="todos">{rows}
    </ul>"#)
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Todo</title>
    <link rel="stylesheet" href="/color-theme.css">
    <link rel="stylesheet" href="/css/todo.css">
  </head>
  <body>
    <main>
      <h1>Todo</h1>
      <form class="add" method="post" action="/add">
        <input type="text" name="title" maxlength="{max_title_length}" placeholder="What needs doing?" autofocus>
        <button type="submit">Add</button>
      </form>
    {list}
    </main>
  </body>
</html>
"#
    )
}

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
