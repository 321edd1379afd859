/*****************************************************************************************[alloc.rs]
Copyright (c) 2008-2010, Niklas Sorensson (MiniSat)

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or
substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT
OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
**************************************************************************************************/

use std::cmp;
use std::fmt;
use std::marker::PhantomData;
use std::ops;

/// A region-based bump allocator over 32-bit words.
///
/// All allocations live in one contiguous region addressed by [`Ref`] word
/// offsets. `free` only accounts the wasted words; the region is reclaimed by
/// relocating live data into a fresh allocator (see the clause store's GC).
#[derive(Debug, Default)]
pub struct RegionAllocator<T: Copy> {
    vec: Vec<T>,
    cap: u32,
    wasted: u32,
}

impl<T: Copy + Default> RegionAllocator<T> {
    pub fn new(start_cap: u32) -> Self {
        let mut ra = Self {
            vec: Vec::new(),
            cap: 0,
            wasted: 0,
        };
        ra.ensure_capacity(start_cap);
        ra
    }

    pub fn len(&self) -> u32 {
        self.vec.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    pub fn wasted(&self) -> u32 {
        self.wasted
    }

    /// Grow the tracked capacity until it covers `min_cap` words.
    ///
    /// Each step multiplies by a factor of roughly 13/8 and adds 2, keeping
    /// the capacity even. The sequence is chosen to approach the `u32` index
    /// limit closely; a step that no longer increases the capacity means the
    /// region is exhausted.
    fn ensure_capacity(&mut self, min_cap: u32) {
        while self.cap < min_cap {
            let delta = ((self.cap >> 1) + (self.cap >> 3) + 2) & !1;
            let (new_cap, overflow) = self.cap.overflowing_add(delta);
            if overflow {
                panic!("region allocator: capacity overflow (cap={})", self.cap);
            }
            self.cap = new_cap;
        }
        self.vec.reserve_exact(self.cap as usize - self.vec.len());
    }

    pub fn alloc(&mut self, size: u32) -> Ref<T> {
        debug_assert!(size > 0);
        let prev_len = self.vec.len() as u32;
        let new_len = prev_len
            .checked_add(size)
            .unwrap_or_else(|| panic!("region allocator: allocation overflow"));
        self.ensure_capacity(new_len);
        self.vec.extend((0..size).map(|_| T::default()));
        Ref(prev_len, PhantomData)
    }

    pub fn free(&mut self, size: u32) {
        self.wasted += size;
    }

    pub fn subslice(&self, r: Ref<T>, len: u32) -> &[T] {
        &self.vec[r.0 as usize..(r.0 + len) as usize]
    }

    pub fn subslice_mut(&mut self, r: Ref<T>, len: u32) -> &mut [T] {
        &mut self.vec[r.0 as usize..(r.0 + len) as usize]
    }

    /// Hand the whole region over to `to`, replacing its contents.
    pub fn move_to(self, to: &mut RegionAllocator<T>) {
        *to = self;
    }
}

impl<T: Copy> ops::Index<Ref<T>> for RegionAllocator<T> {
    type Output = T;
    #[inline(always)]
    fn index(&self, index: Ref<T>) -> &Self::Output {
        &self.vec[index.0 as usize]
    }
}
impl<T: Copy> ops::IndexMut<Ref<T>> for RegionAllocator<T> {
    #[inline(always)]
    fn index_mut(&mut self, index: Ref<T>) -> &mut Self::Output {
        &mut self.vec[index.0 as usize]
    }
}

/// A reference to a `T` value living in the allocator.
///
/// The reference is invariant in `T`.
#[derive(Clone, Copy)]
pub struct Ref<T: Copy>(u32, PhantomData<fn(T) -> T>);

impl<T: Copy> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Ref").field(&self.0).finish()
    }
}
impl<T: Copy> PartialEq for Ref<T> {
    #[inline(always)]
    fn eq(&self, rhs: &Self) -> bool {
        self.0 == rhs.0
    }
}
impl<T: Copy> Eq for Ref<T> {}
impl<T: Copy> PartialOrd for Ref<T> {
    fn partial_cmp(&self, rhs: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(rhs))
    }
}
impl<T: Copy> Ord for Ref<T> {
    #[inline(always)]
    fn cmp(&self, rhs: &Self) -> cmp::Ordering {
        Ord::cmp(&self.0, &rhs.0)
    }
}
impl<T: Copy> Default for Ref<T> {
    fn default() -> Self {
        Ref(0, PhantomData)
    }
}

impl<T: Copy> Ref<T> {
    pub const UNDEF: Self = Ref(!0, PhantomData);
}

impl<T: Copy> ops::Add<u32> for Ref<T> {
    type Output = Ref<T>;
    fn add(self, rhs: u32) -> Self::Output {
        Ref(self.0 + rhs, PhantomData)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_alloc_is_contiguous() {
        let mut ra: RegionAllocator<u32> = RegionAllocator::new(4);
        let a = ra.alloc(3);
        let b = ra.alloc(2);
        assert_eq!(a + 3, b);
        assert_eq!(ra.len(), 5);
        ra[a] = 7;
        ra[b + 1] = 9;
        assert_eq!(ra.subslice(a, 1), &[7]);
        assert_eq!(ra[b + 1], 9);
    }

    #[test]
    fn test_free_accounts_waste_only() {
        let mut ra: RegionAllocator<u32> = RegionAllocator::new(0);
        ra.alloc(10);
        ra.free(4);
        assert_eq!(ra.len(), 10);
        assert_eq!(ra.wasted(), 4);
    }

    #[test]
    fn test_grows_from_zero() {
        let mut ra: RegionAllocator<u32> = RegionAllocator::new(0);
        let r = ra.alloc(100);
        assert_eq!(r, Ref::default());
        assert_eq!(ra.len(), 100);
    }
}
