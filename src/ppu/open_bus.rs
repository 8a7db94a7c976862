/*!
open_bus.rs - The PPU's internal I/O latch.

Every CPU write to $2000-$2007 drives all eight bits of the latch; some
reads drive a subset. Undriven bits read back the latch. Each bit holds
its charge for a while and then decays to 0: the latch keeps a history of
which bits were refreshed in each eight-frame window, and at every window
boundary any bit not refreshed in the last three windows is cleared.
*/

const WINDOWS: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct OpenBus {
    value: u8,
    /// `refreshed[0]` is the window in progress.
    refreshed: [u8; WINDOWS],
}

impl OpenBus {
    #[inline]
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Drive the bits in `mask` to `value`.
    #[inline]
    pub fn drive(&mut self, value: u8, mask: u8) {
        self.value = (self.value & !mask) | (value & mask);
        self.refreshed[0] |= mask;
    }

    /// Called once every eight frames.
    pub fn decay(&mut self) {
        let alive = self.refreshed.iter().fold(0, |acc, w| acc | w);
        self.value &= alive;
        self.refreshed.rotate_right(1);
        self.refreshed[0] = 0;
    }
}
