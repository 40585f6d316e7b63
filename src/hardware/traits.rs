pub trait Led {
    fn on(&mut self);
    fn off(&mut self);
    fn toggle(&mut self);
}

/// A momentary push button. Reads are level-based; edge detection lives with the caller.
pub trait Button {
    fn is_pressed(&mut self) -> bool;
}
