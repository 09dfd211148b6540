#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Direction {
    Up,
    Down,
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    Navigate(Direction),
    EnterFilterMode,
    ExitFilterMode,
    ClearFilter,
    UpdateFilter(String),
    CycleTheme,
    ToggleHelp,
    Refresh,
    None,
}
