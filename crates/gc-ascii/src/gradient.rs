use gc_core::frame::LumaPlane;

/// Normalised 1-D Gaussian kernel of odd length `size`.
///
/// Sigma follows the usual size-derived rule
/// `0.3 · ((size − 1) / 2 − 1) + 0.8`.
///
/// # Example
/// ```
/// use gc_ascii::gradient::gaussian_kernel;
/// let k = gaussian_kernel(5);
/// assert_eq!(k.len(), 5);
/// assert!((k.iter().sum::<f32>() - 1.0).abs() < 1e-5);
/// ```
#[must_use]
pub fn gaussian_kernel(size: usize) -> Vec<f32> {
    let size = size.max(1) | 1;
    if size == 1 {
        return vec![1.0];
    }
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let half = (size / 2) as i32;
    let mut kernel: Vec<f32> = (-half..=half)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= sum);
    kernel
}

/// Separable Gaussian blur, borders replicated.
#[must_use]
pub fn gaussian_blur(plane: &LumaPlane, size: usize) -> LumaPlane {
    let kernel = gaussian_kernel(size);
    if kernel.len() == 1 {
        return plane.clone();
    }
    let half = (kernel.len() / 2) as i64;

    let mut horizontal = LumaPlane::new(plane.width, plane.height);
    for y in 0..plane.height {
        for x in 0..plane.width {
            let acc: f32 = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * plane.get_clamped(i64::from(x) + k as i64 - half, i64::from(y)))
                .sum();
            horizontal.set(x, y, acc);
        }
    }

    let mut out = LumaPlane::new(plane.width, plane.height);
    for y in 0..plane.height {
        for x in 0..plane.width {
            let acc: f32 = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| {
                    w * horizontal.get_clamped(i64::from(x), i64::from(y) + k as i64 - half)
                })
                .sum();
            out.set(x, y, acc);
        }
    }
    out
}

/// Horizontal and vertical 3×3 Sobel responses for every sample.
#[derive(Clone, Debug)]
pub struct Gradients {
    pub width: u32,
    pub height: u32,
    pub gx: Vec<f32>,
    pub gy: Vec<f32>,
}

impl Gradients {
    /// Sobel 3×3 over `plane`, borders replicated.
    ///
    /// # Example
    /// ```
    /// use gc_core::frame::LumaPlane;
    /// use gc_ascii::gradient::Gradients;
    /// let flat = LumaPlane::filled(8, 8, 90.0);
    /// let g = Gradients::compute(&flat);
    /// assert!(g.gx.iter().chain(&g.gy).all(|v| *v == 0.0));
    /// ```
    #[must_use]
    pub fn compute(plane: &LumaPlane) -> Self {
        let len = plane.width as usize * plane.height as usize;
        let mut gx = vec![0.0; len];
        let mut gy = vec![0.0; len];

        for y in 0..plane.height {
            for x in 0..plane.width {
                let (xi, yi) = (i64::from(x), i64::from(y));
                let p = |dx: i64, dy: i64| plane.get_clamped(xi + dx, yi + dy);

                let tl = p(-1, -1);
                let tc = p(0, -1);
                let tr = p(1, -1);
                let ml = p(-1, 0);
                let mr = p(1, 0);
                let bl = p(-1, 1);
                let bc = p(0, 1);
                let br = p(1, 1);

                let i = plane.index(x, y);
                gx[i] = -tl + tr - 2.0 * ml + 2.0 * mr - bl + br;
                gy[i] = -tl - 2.0 * tc - tr + bl + 2.0 * bc + br;
            }
        }

        Self {
            width: plane.width,
            height: plane.height,
            gx,
            gy,
        }
    }

    /// L2 magnitude at flat index `i`.
    #[inline(always)]
    #[must_use]
    pub fn magnitude(&self, i: usize) -> f32 {
        self.gx[i].hypot(self.gy[i])
    }
}
