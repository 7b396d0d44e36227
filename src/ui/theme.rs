use ratatui::style::Color;

pub struct Theme {
    pub fg: Color,
    pub primary: Color,   // Blue
    pub secondary: Color, // Orange
    pub comment: Color,   // Grey
    pub success: Color,   // Green
    pub error: Color,     // Red
    pub border: Color,
    pub title: Color,
    pub line_number: Color,
    pub current_line_bg: Color,
    pub current_line_fg: Color,
    pub type_tag: Color, // The "(c) " prefix in the variables pane
    pub status_bg: Color,
    pub status_fg: Color,
}

pub const DEFAULT_THEME: Theme = Theme {
    fg: Color::Rgb(205, 214, 244),
    primary: Color::Rgb(137, 180, 250),   // Blue
    secondary: Color::Rgb(250, 179, 135), // Orange
    comment: Color::Rgb(108, 112, 134),
    success: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),
    border: Color::Rgb(108, 112, 134),
    title: Color::Rgb(166, 227, 161), // Green pane titles
    line_number: Color::Rgb(108, 112, 134),
    current_line_bg: Color::Rgb(49, 80, 132), // Blue band for the executing line
    current_line_fg: Color::Rgb(235, 240, 255),
    type_tag: Color::Rgb(148, 226, 213), // Cyan/teal type tags
    status_bg: Color::Rgb(205, 214, 244),
    status_fg: Color::Rgb(30, 30, 46),
};
