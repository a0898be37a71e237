//! Stylesheets compiled into the binary.

const TODO_CSS: &str = include_str!("../static/css/todo.css");

/// Color themes selectable with `TODO_THEME`.
pub const THEMES: &[(&str, &str)] = &[
    ("dracula", include_str!("../static/color-themes/dracula.css")),
    ("nord", include_str!("../static/color-themes/nord.css")),
    (
        "solarized-light",
        include_str!("../static/color-themes/solarized-light.css"),
    ),
];

/// Looks up a file served under `/css/`.
pub fn stylesheet(name: &str) -> Option<&'static str> {
    match name {
        "todo.css" => Some(TODO_CSS),
        _ => None,
    }
}

pub fn theme(name: &str) -> Option<&'static str> {
    THEMES
        .iter()
        .find(|(theme, _)| *theme == name)
        .map(|(_, css)| *css)
}

pub fn theme_names() -> impl Iterator<Item = &'static str> {
    THEMES.iter().map(|(name, _)| *name)
}
