//! The curated set of names a client handler may reference without
//! importing or declaring them.
//!
//! A closed configuration: language primordials, the web platform surface
//! commonly touched from event handlers, timers, `console`, `crypto`,
//! `Intl`, and `arguments`. Hosts extend it through the `extra_globals`
//! option; the built-in set is never derived at runtime.

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;

static GLOBALS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| BUILTIN_GLOBALS.iter().copied().collect());

/// Returns `true` when `name` resolves in the client environment without any
/// import or declaration.
pub(crate) fn is_global(name: &str, extra: &[String]) -> bool {
    GLOBALS.contains(name) || extra.iter().any(|g| g == name)
}

#[rustfmt::skip]
static BUILTIN_GLOBALS: &[&str] = &[
    // language primordials
    "Array", "ArrayBuffer", "BigInt", "BigInt64Array", "BigUint64Array", "Boolean",
    "DataView", "Date", "Error", "EvalError", "FinalizationRegistry", "Float32Array",
    "Float64Array", "Function", "Infinity", "Int16Array", "Int32Array", "Int8Array",
    "JSON", "Map", "Math", "NaN", "Number", "Object", "Promise", "Proxy", "RangeError",
    "ReferenceError", "Reflect", "RegExp", "Set", "String", "Symbol", "SyntaxError",
    "TypeError", "URIError", "Uint16Array", "Uint32Array", "Uint8Array",
    "Uint8ClampedArray", "WeakMap", "WeakRef", "WeakSet", "decodeURI",
    "decodeURIComponent", "encodeURI", "encodeURIComponent", "eval", "globalThis",
    "isFinite", "isNaN", "parseFloat", "parseInt", "queueMicrotask", "structuredClone",
    "undefined",
    // window and document
    "window", "self", "document", "navigator", "location", "history", "screen",
    "frames", "top", "parent", "origin", "devicePixelRatio", "innerHeight", "innerWidth",
    "alert", "confirm", "prompt", "open", "close", "postMessage", "print", "focus",
    "blur", "scroll", "scrollBy", "scrollTo", "getComputedStyle", "getSelection",
    "matchMedia", "addEventListener", "removeEventListener", "dispatchEvent",
    // fetch and networking
    "fetch", "Headers", "Request", "Response", "FormData", "URL", "URLSearchParams",
    "AbortController", "AbortSignal", "WebSocket", "EventSource", "XMLHttpRequest",
    // events
    "Event", "EventTarget", "CustomEvent", "MessageEvent", "ErrorEvent", "CloseEvent",
    "ProgressEvent", "StorageEvent", "PopStateEvent", "HashChangeEvent", "PageTransitionEvent",
    "UIEvent", "MouseEvent", "PointerEvent", "KeyboardEvent", "TouchEvent", "WheelEvent",
    "FocusEvent", "InputEvent", "SubmitEvent", "DragEvent", "ClipboardEvent",
    "AnimationEvent", "TransitionEvent", "BeforeUnloadEvent",
    // DOM
    "Node", "NodeList", "Element", "HTMLElement", "SVGElement", "HTMLAnchorElement",
    "HTMLButtonElement", "HTMLCanvasElement", "HTMLDivElement", "HTMLFormElement",
    "HTMLImageElement", "HTMLInputElement", "HTMLSelectElement", "HTMLTextAreaElement",
    "DocumentFragment", "DOMParser", "DOMRect", "Range", "MutationObserver",
    "ResizeObserver", "ResizeObserverEntry", "IntersectionObserver",
    "IntersectionObserverEntry", "CSS", "CSSStyleSheet", "FontFace", "Image", "Audio",
    "Option", "ImageData", "ImageBitmap", "createImageBitmap", "OffscreenCanvas",
    "Path2D", "MediaQueryList",
    // files, blobs, streams, encoding
    "Blob", "File", "FileList", "FileReader", "TextEncoder", "TextDecoder",
    "ReadableStream", "WritableStream", "TransformStream", "CompressionStream",
    "DecompressionStream", "atob", "btoa",
    // storage and workers
    "localStorage", "sessionStorage", "indexedDB", "caches", "cookieStore",
    "Worker", "SharedWorker", "ServiceWorker", "BroadcastChannel", "MessageChannel",
    "MessagePort", "Notification",
    // scheduling and performance
    "setTimeout", "clearTimeout", "setInterval", "clearInterval",
    "requestAnimationFrame", "cancelAnimationFrame", "requestIdleCallback",
    "cancelIdleCallback", "performance", "Performance", "PerformanceObserver",
    "reportError",
    // misc platform
    "console", "crypto", "Crypto", "SubtleCrypto", "CryptoKey", "Intl",
    "History", "Location", "Navigator", "Storage", "arguments",
];
