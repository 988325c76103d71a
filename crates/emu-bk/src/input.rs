//! Host input mapped onto the BK user-port peripherals.

use emu_core::{PadButtons, PointerInput, PointerState};

/// Joystick adapter bit for each pad button.
const JOYSTICK_BITS: [(PadButtons, u16); 8] = [
    (PadButtons::A, 1 << 0),
    (PadButtons::B, 1 << 1),
    (PadButtons::X, 1 << 2),
    (PadButtons::Y, 1 << 3),
    (PadButtons::RIGHT, 1 << 4),
    (PadButtons::DOWN, 1 << 5),
    (PadButtons::LEFT, 1 << 9),
    (PadButtons::UP, 1 << 10),
];

/// Adapter state word for both controller ports.
///
/// The BK has a single joystick input, so both players share it: player 2's
/// buttons land on the same bits as player 1's.
#[must_use]
pub fn joystick_word(pads: &[PadButtons; 2]) -> u16 {
    pads.iter()
        .flat_map(|pad| {
            JOYSTICK_BITS
                .iter()
                .filter(move |(button, _)| pad.contains(*button))
                .map(|&(_, bit)| bit)
        })
        .fold(0, |word, bit| word | bit)
}

/// Fold one frame of pointer input into the accumulated mouse state.
///
/// `enable` is the adapter's button enable value; the button word is
/// `enable * (left | right << 1)`, so a disabled adapter reports no buttons.
pub fn accumulate_pointer(state: &mut PointerState, input: &PointerInput, enable: u16) {
    state.rel_x = state.rel_x.wrapping_add(i32::from(input.dx));
    state.rel_y = state.rel_y.wrapping_add(i32::from(input.dy));
    let pressed = u16::from(input.left) | (u16::from(input.right) << 1);
    state.buttons = enable.wrapping_mul(pressed);
}
