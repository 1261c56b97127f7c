//! Built-in document shown when there is no draft to restore.

pub const SAMPLE_DOCUMENT: &str = r#"# Scriptor

Write as formatted text, export to Markdown when you are done.

## A short list

- First
- Second

## A table

| Fruit | Count |
| --- | ---: |
| Apples | 3 |
| Pears | 5 |

Some **bold**, some _italic_, some ~~struck~~ text and a [link](https://example.org).

```mermaid
graph TD
  Start --> Stop
```

```js
console.log("hello");
```

> Quoted words.

* * *

- [ ] Open task
- [x] Done task

Inline code: `let x = 42;`

![Placeholder](https://via.placeholder.com/150)
"#;
