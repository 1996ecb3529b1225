pub struct ProgressGuard<'a> {
    sink: &'a mut dyn FnMut(f64),
    last: f64,
}

impl<'a> ProgressGuard<'a> {
    pub fn new(sink: &'a mut dyn FnMut(f64)) -> Self {
        Self { sink, last: 0.0 }
    }

    pub fn report(&mut self, fraction: f64) {
        let clamped = fraction.clamp(0.0, 1.0);
        if clamped <= self.last {
            return;
        }
        self.last = clamped;
        (self.sink)(clamped);
    }

    pub fn finish(&mut self) {
        if self.last >= 1.0 {
            return;
        }
        self.last = 1.0;
        (self.sink)(1.0);
    }
}
