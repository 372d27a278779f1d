/*!
Module containing all the non-portable code. Only re-exports the best backend available
as the definitive `Active` backend for the entire crate, but still enables whatever other
modules are available on the target system. This is done for testing purposes, and none of
it is accessible by the end-user of this crate.

Every backend provides a `Matrix<N>`: `N` independent ChaCha matrices held row-wise, one
128-bit vector per row. `Matrix<3>` is the wide path and `Matrix<1>` handles whatever is
left over. Both are the same code, so a block cannot depend on which of them produced it.

A double round is a column round on the rows as they are, followed by a column round on
rows whose words have been rotated so that each column of the rotated matrix holds one of
the original diagonals. The rotation is undone afterwards:

```text
[a0, a1, a2, a3]    [a0, a1, a2, a3]
[b0, b1, b2, b3] => [b1, b2, b3, b0]
[c0, c1, c2, c3]    [c2, c3, c0, c1]
[d0, d1, d2, d3]    [d3, d0, d1, d2]
```

There is no runtime dispatch; the backend is picked from the target features the crate is
compiled with. SSE2 is part of the x86_64 baseline and NEON of the aarch64 one, so the
vectorized backends are what a default build gets on those targets.
*/

// Only the active backend is reachable outside of tests.
#[allow(dead_code)]
pub mod soft;

#[cfg(all(
    any(target_arch = "x86_64", target_arch = "x86"),
    target_feature = "sse2"
))]
#[allow(dead_code)]
pub mod sse2;

#[cfg(all(
    target_arch = "aarch64",
    target_feature = "neon",
    target_endian = "little"
))]
#[allow(dead_code)]
pub mod neon;

cfg_if::cfg_if! {
    if #[cfg(feature = "force-soft")] {
        pub use soft::Soft as Active;
    } else if #[cfg(all(
        any(target_arch = "x86_64", target_arch = "x86"),
        target_feature = "sse2"
    ))] {
        pub use sse2::Sse2 as Active;
    } else if #[cfg(all(
        target_arch = "aarch64",
        target_feature = "neon",
        target_endian = "little"
    ))] {
        pub use neon::Neon as Active;
    } else {
        pub use soft::Soft as Active;
    }
}
