//! Session history for a frame: back/forward stacks and the current URL.

/// Navigation history for one frame.
#[derive(Debug, Clone)]
pub struct History {
    back_stack: Vec<String>,
    forward_stack: Vec<String>,
    current: String,
}

impl History {
    pub fn new(url: &str) -> Self {
        Self {
            back_stack: Vec::new(),
            forward_stack: Vec::new(),
            current: url.to_string(),
        }
    }

    /// Navigate to a new URL. Pushes the current page to the back stack
    /// and clears the forward stack.
    pub fn navigate(&mut self, url: &str) {
        let previous = std::mem::replace(&mut self.current, url.to_string());
        self.back_stack.push(previous);
        self.forward_stack.clear();
    }

    /// Go back one entry. Returns `false` at the start of history.
    pub fn go_back(&mut self) -> bool {
        let Some(prev) = self.back_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.current, prev);
        self.forward_stack.push(current);
        true
    }

    /// Go forward one entry. Returns `false` at the end of history.
    pub fn go_forward(&mut self) -> bool {
        let Some(next) = self.forward_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.current, next);
        self.back_stack.push(current);
        true
    }

    /// Move `delta` entries (negative = back), stopping at either end.
    /// Returns the number of entries actually traversed.
    pub fn go(&mut self, delta: i32) -> u32 {
        let mut moved = 0;
        for _ in 0..delta.unsigned_abs() {
            let ok = if delta < 0 {
                self.go_back()
            } else {
                self.go_forward()
            };
            if !ok {
                break;
            }
            moved += 1;
        }
        moved
    }

    /// The current URL.
    pub fn current_url(&self) -> &str {
        &self.current
    }

    pub fn can_go_back(&self) -> bool {
        !self.back_stack.is_empty()
    }

    pub fn can_go_forward(&self) -> bool {
        !self.forward_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigate_and_go_back() {
        let mut h = History::new("https://a.com");
        h.navigate("https://b.com");
        h.navigate("https://c.com");
        assert_eq!(h.go(-1), 1);
        assert_eq!(h.current_url(), "https://b.com");
        assert!(h.can_go_forward());
    }

    #[test]
    fn go_stops_at_ends() {
        let mut h = History::new("https://a.com");
        h.navigate("https://b.com");
        assert_eq!(h.go(-5), 1);
        assert_eq!(h.current_url(), "https://a.com");
        assert_eq!(h.go(3), 1);
        assert_eq!(h.current_url(), "https://b.com");
        assert_eq!(h.go(0), 0);
    }

    #[test]
    fn navigate_clears_forward_stack() {
        let mut h = History::new("https://a.com");
        h.navigate("https://b.com");
        h.go_back();
        h.navigate("https://c.com");
        assert!(!h.can_go_forward());
        assert!(h.can_go_back());
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        fn arb_urls(min: usize, max: usize) -> impl Strategy<Value = Vec<String>> {
            let url = "[a-z]{3,10}".prop_map(|s| format!("https://{s}.com"));
            proptest::collection::vec(url, min..max)
        }

        proptest! {
            #[test]
            fn back_then_forward_returns_to_same(urls in arb_urls(2, 10), n in 1i32..10) {
                let mut h = History::new("about:blank");
                for url in &urls {
                    h.navigate(url);
                }
                let before = h.current_url().to_string();
                let moved = h.go(-n);
                h.go(moved as i32);
                prop_assert_eq!(h.current_url(), before.as_str());
            }
        }
    }
}
