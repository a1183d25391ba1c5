//! Sample message exercising every supported construct.

pub const DEMO_CONTENT: &str = r#"# Markdown in chat replies

## Text formatting

This is **bold text** and *italic text*. The __underscore__ and _underscore_ forms work too.

You can use ~~strikethrough~~ and ==highlighted== text.

## Code

Inline code: `console.log('Hello World')`

A code block:

```javascript
function fibonacci(n) {
  if (n <= 1) return n;
  return fibonacci(n - 1) + fibonacci(n - 2);
}

console.log(fibonacci(10)); // 55
```

```python
def hello_world():
    print("Hello from the assistant!")
    return "Success"
```

## Lists

### Unordered
- First item
- Second item
  - Nested item
  - Another nested item
- Third item

### Ordered
1. Do this first
2. Then that
3. Finally this

### Tasks
- [x] Finished task
- [ ] Open task
- [x] Another finished task

## Quotes

> A quoted passage. The assistant can help with programming,
> writing and data analysis.

## Links

Read more on [the project site](https://www.rust-lang.org).

Bare links work too: https://github.com/rust-lang/rust, www.example.com
and example.org, or mail someone@example.com.

## Tables

| Feature | Supported | Notes |
|---------|:---------:|-------|
| Formatting | yes | bold, italic, ... |
| Code | yes | fenced and inline |
| Tables | yes | needs a separator row |
| Math | yes | shown verbatim |

## Math

Inline: $E = mc^2$

Display:
$$\int_{-\infty}^{\infty} e^{-x^2} dx = \sqrt{\pi}$$

## Special elements

Press <kbd>Ctrl</kbd> + <kbd>C</kbd> to copy.

---

**Tip**: every one of these formats can be used in the chat.
"#;
