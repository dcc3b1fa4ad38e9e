use crate::volume::Input;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    /// Forwarded to the volume controller.
    Volume(Input),
    /// Click or drag on the volume slider.
    SliderSet(u8),
    PointerOverBar(bool),
    TogglePause,
    FetchLyrics,
    ScrollLyrics(i16),
    ToggleHelp,
    Resize,
}
