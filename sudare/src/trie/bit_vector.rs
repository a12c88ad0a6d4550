const UNIT_SIZE: usize = 32;

/// Bit vector supporting rank queries, used to number DAWG intersections.
#[derive(Default)]
pub struct BitVector {
    units: Vec<u32>,
    ranks: Vec<u32>,
    num_ones: u32,
    len: usize,
}

impl BitVector {
    #[inline(always)]
    pub fn get(&self, id: usize) -> bool {
        (self.units[id / UNIT_SIZE] >> (id % UNIT_SIZE)) & 1 == 1
    }

    /// Counts the ones in `[0, id]`. Valid after [`BitVector::build`].
    #[inline(always)]
    pub fn rank(&self, id: usize) -> u32 {
        let unit_id = id / UNIT_SIZE;
        let mask = u32::MAX >> (UNIT_SIZE - (id % UNIT_SIZE) - 1);
        self.ranks[unit_id] + (self.units[unit_id] & mask).count_ones()
    }

    pub fn set(&mut self, id: usize, bit: bool) {
        let unit = &mut self.units[id / UNIT_SIZE];
        if bit {
            *unit |= 1 << (id % UNIT_SIZE);
        } else {
            *unit &= !(1 << (id % UNIT_SIZE));
        }
    }

    #[inline(always)]
    pub const fn num_ones(&self) -> u32 {
        self.num_ones
    }

    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    pub fn push(&mut self) {
        if self.len % UNIT_SIZE == 0 {
            self.units.push(0);
        }
        self.len += 1;
    }

    pub fn build(&mut self) {
        self.ranks = Vec::with_capacity(self.units.len());
        self.num_ones = 0;
        for &unit in &self.units {
            self.ranks.push(self.num_ones);
            self.num_ones += unit.count_ones();
        }
    }
}
