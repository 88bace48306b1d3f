pub use metrics::*;

lazy_static! {
    /*
     * Attempts
     */
    pub static ref BLOCK_INPUTS_TRIED: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_block_inputs_tried_total",
        "Count of pending block inputs a resolution was attempted for"
    );
    pub static ref BLOCK_INPUTS_RETRIED: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_block_inputs_retried_total",
        "Count of resolution attempts for block roots that had been attempted before"
    );
    pub static ref BLOCK_INPUTS_AVAILABLE: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_block_inputs_available_total",
        "Count of block inputs made available by a resolution attempt"
    );
    pub static ref BLOCK_INPUTS_AVAILABLE_USING_ENGINE: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_block_inputs_available_using_engine_total",
        "Count of block inputs made available with at least one blob from the execution engine"
    );
    pub static ref BLOCK_INPUTS_RETRIED_AVAILABLE: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_block_inputs_retried_available_total",
        "Count of retried block inputs made available"
    );
    pub static ref BLOCK_INPUTS_UNAVAILABLE: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_block_inputs_unavailable_total",
        "Count of resolution attempts that ended with missing blobs"
    );
    pub static ref AVAILABILITY_SOURCE: Result<IntCounterVec> = try_create_int_counter_vec(
        "blob_resolver_availability_source_total",
        "Count of block inputs made available, by the source of the blob that completed them",
        &["source"]
    );
    pub static ref RESOLUTION_TIMES: Result<Histogram> = try_create_histogram(
        "blob_resolver_resolution_seconds",
        "Time taken to resolve the blobs of a pending block input"
    );

    /*
     * Per blob
     */
    pub static ref BLOBS_ALREADY_AVAILABLE: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_blobs_already_available_total",
        "Count of blobs already present when a resolution attempt started"
    );
    pub static ref ENGINE_BLOBS_CACHE_HITS: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_engine_blobs_cache_hits_total",
        "Count of blobs served from the engine blobs cache"
    );
    pub static ref ENGINE_BLOBS_CACHE_NULL_HITS: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_engine_blobs_cache_null_hits_total",
        "Count of cached engine answers that recorded the blob as absent"
    );
    pub static ref ENGINE_BLOBS_CACHE_MISSES: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_engine_blobs_cache_misses_total",
        "Count of blobs with no cached engine answer"
    );
    pub static ref BLOBS_DELAYED_GOSSIP_AVAILABLE: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_blobs_delayed_gossip_available_total",
        "Count of blobs that arrived from elsewhere while the engine was being queried"
    );
    pub static ref BLOBS_DELAYED_GOSSIP_SAVED_COMPUTE: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_blobs_delayed_gossip_saved_compute_total",
        "Count of engine blobs not turned into sidecars because they had already arrived"
    );

    /*
     * Execution engine
     */
    pub static ref ENGINE_GET_BLOBS_REQUESTS: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_engine_get_blobs_requests_total",
        "Count of batched blob requests sent to the execution engine"
    );
    pub static ref ENGINE_GET_BLOBS_REQUESTED: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_engine_get_blobs_requested_total",
        "Count of blobs requested from the execution engine"
    );
    pub static ref ENGINE_GET_BLOBS_RETURNED: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_engine_get_blobs_returned_total",
        "Count of blobs returned by the execution engine"
    );
    pub static ref ENGINE_GET_BLOBS_NULL: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_engine_get_blobs_null_total",
        "Count of blobs the execution engine did not have"
    );
    pub static ref ENGINE_GET_BLOBS_ERRORS: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_engine_get_blobs_errors_total",
        "Count of failed blob requests to the execution engine"
    );
    pub static ref ENGINE_GET_BLOBS_USEFUL: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_engine_get_blobs_useful_total",
        "Count of blobs returned by the execution engine that were imported"
    );

    /*
     * Network
     */
    pub static ref NETWORK_BLOBS_REQUESTED: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_network_blobs_requested_total",
        "Count of blobs requested from peers"
    );
    pub static ref NETWORK_BLOBS_RECEIVED: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_network_blobs_received_total",
        "Count of blobs received from peers"
    );
    pub static ref NETWORK_BLOBS_RETRIED_REQUESTED: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_network_blobs_retried_requested_total",
        "Count of blobs requested from peers on a retried attempt"
    );
    pub static ref NETWORK_BLOBS_RETRIED_RECEIVED: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_network_blobs_retried_received_total",
        "Count of blobs received from peers on a retried attempt"
    );
    pub static ref NETWORK_BLOBS_INVALID: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_network_blobs_invalid_total",
        "Count of blobs from peers discarded as not matching their block"
    );
    pub static ref NETWORK_REQUEST_ERRORS: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_network_request_errors_total",
        "Count of failed blob requests to peers"
    );

    /*
     * Caches
     */
    pub static ref ENGINE_BLOBS_CACHE_SIZE: Result<IntGauge> = try_create_int_gauge(
        "blob_resolver_engine_blobs_cache_size",
        "Number of entries in the engine blobs cache"
    );
    pub static ref ENGINE_BLOBS_CACHE_PRUNED: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_engine_blobs_cache_pruned_total",
        "Count of entries evicted from the engine blobs cache"
    );
    pub static ref RETRY_TRACKER_SIZE: Result<IntGauge> = try_create_int_gauge(
        "blob_resolver_retry_tracker_size",
        "Number of block roots in the retry tracker"
    );
    pub static ref RETRY_TRACKER_PRUNED: Result<IntCounter> = try_create_int_counter(
        "blob_resolver_retry_tracker_pruned_total",
        "Count of block roots evicted from the retry tracker"
    );
}
